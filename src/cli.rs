//! CLI argument parsing for vktabgen

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "vktabgen")]
#[command(version)]
#[command(
    about = "Compile a Vulkan API registry into dispatch-table layout and enablement artifacts",
    long_about = None
)]
pub struct Cli {
    /// Vulkan API registry XML file (repeat for additional documents)
    #[arg(long = "xml", value_name = "FILE", required = true)]
    pub xml_files: Vec<PathBuf>,

    /// API identifier used to filter registry elements
    #[arg(long = "api", value_name = "API", default_value = "vulkan")]
    pub api: String,

    /// Include provisional (beta) extensions
    #[arg(long = "beta")]
    pub beta: bool,

    /// Output path for the table-layout artifact (string maps, hash slots, compaction)
    #[arg(long = "out-tables", value_name = "FILE")]
    pub out_tables: Option<PathBuf>,

    /// Output path for the enablement-rules artifact
    #[arg(long = "out-rules", value_name = "FILE")]
    pub out_rules: Option<PathBuf>,

    /// Print per-category hash collision histograms to stderr
    #[arg(long = "collision-stats")]
    pub collision_stats: bool,

    /// List the supported extensions in stable order (KHR, EXT, vendors)
    #[arg(long = "list-extensions")]
    pub list_extensions: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_repeated_xml() {
        let cli = Cli::parse_from(["vktabgen", "--xml", "vk.xml", "--xml", "video.xml"]);
        assert_eq!(cli.xml_files.len(), 2);
        assert_eq!(cli.api, "vulkan");
        assert!(!cli.beta);
    }

    #[test]
    fn test_cli_requires_xml() {
        assert!(Cli::try_parse_from(["vktabgen"]).is_err());
    }

    #[test]
    fn test_cli_outputs_and_flags() {
        let cli = Cli::parse_from([
            "vktabgen",
            "--xml",
            "vk.xml",
            "--beta",
            "--api",
            "vulkansc",
            "--out-tables",
            "tables.json",
            "--out-rules",
            "rules.json",
        ]);
        assert!(cli.beta);
        assert_eq!(cli.api, "vulkansc");
        assert!(cli.out_tables.is_some());
        assert!(cli.out_rules.is_some());
    }

    #[test]
    fn test_cli_list_extensions_off_by_default() {
        let cli = Cli::parse_from(["vktabgen", "--xml", "vk.xml"]);
        assert!(!cli.list_extensions);
        let cli = Cli::parse_from(["vktabgen", "--xml", "vk.xml", "--list-extensions"]);
        assert!(cli.list_extensions);
    }
}
