//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

use crate::report::ReportConfig;

#[derive(Parser, Debug)]
#[command(
    name = "pmuprof",
    about = "Attribute PMU samples to kernel and user functions",
    after_help = "\
EXAMPLES:
    pmuprof prof.txt kernel.elf user.elf          Flat time per function
    pmuprof -d prof.txt kernel.elf user.elf       Also annotate disassembly
    pmuprof -b prof.txt kernel.elf user.elf       Also write graph.dot (backtrace logs)"
)]
pub struct Args {
    /// PMU sample log (flat or backtrace format)
    #[arg(value_name = "PROFILE")]
    pub profile: PathBuf,

    /// Kernel binary used to attribute kernel samples
    #[arg(value_name = "KERNEL")]
    pub kernel: PathBuf,

    /// User binary used to attribute user samples
    #[arg(value_name = "USER")]
    pub user: PathBuf,

    /// Print each ranked function's disassembly with per-instruction sample counts
    #[arg(short, long)]
    pub disassemble: bool,

    /// Write the call graph in Graphviz format (backtrace logs only)
    #[arg(short = 'b', long)]
    pub build_graph: bool,

    /// Destination of the call graph
    #[arg(long, value_name = "FILE", default_value = "graph.dot")]
    pub graph_output: PathBuf,

    /// Also write the reports as JSON
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Symbol dump tool
    #[arg(long, value_name = "PATH", default_value = "nm")]
    pub nm: PathBuf,

    /// Disassembly tool
    #[arg(long, value_name = "PATH", default_value = "objdump")]
    pub objdump: PathBuf,

    /// Skip the stripped-binary warning
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Options forwarded to the report stage.
    #[must_use]
    pub fn report_config(&self) -> ReportConfig {
        ReportConfig {
            annotate_disassembly: self.disassemble,
            graph_output: self.build_graph.then(|| self.graph_output.clone()),
            json_output: self.export.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_arguments() {
        let args = Args::try_parse_from(["pmuprof", "prof.txt", "kernel", "user"]).unwrap();

        assert_eq!(args.profile, PathBuf::from("prof.txt"));
        assert_eq!(args.kernel, PathBuf::from("kernel"));
        assert_eq!(args.user, PathBuf::from("user"));

        let config = args.report_config();
        assert!(!config.annotate_disassembly);
        assert!(config.graph_output.is_none());
        assert!(config.json_output.is_none());
    }

    #[test]
    fn test_flags_map_to_config() {
        let args =
            Args::try_parse_from(["pmuprof", "-d", "-b", "prof.txt", "kernel", "user"]).unwrap();
        let config = args.report_config();

        assert!(config.annotate_disassembly);
        assert_eq!(config.graph_output, Some(PathBuf::from("graph.dot")));
    }

    #[test]
    fn test_quiet_flag() {
        let args = Args::try_parse_from(["pmuprof", "-q", "prof.txt", "kernel", "user"]).unwrap();
        assert!(args.quiet);
        let args = Args::try_parse_from(["pmuprof", "prof.txt", "kernel", "user"]).unwrap();
        assert!(!args.quiet);
    }

    #[test]
    fn test_wrong_positional_count_is_usage_error() {
        assert!(Args::try_parse_from(["pmuprof", "prof.txt", "kernel"]).is_err());
        assert!(Args::try_parse_from(["pmuprof", "a", "b", "c", "d"]).is_err());
    }
}
