use clap::Parser;
use crate::models::SourceCategory;

#[derive(Parser, Debug)]
#[command(name = "getdocs")]
#[command(about = "Download PDF guides, whitepapers and solution briefs from the documentation portal")]
#[command(version)]
pub struct Cli {
    /// Download the service documentation guides
    #[arg(short, long)]
    pub documentation: bool,

    /// Download whitepapers
    #[arg(short, long)]
    pub whitepapers: bool,

    /// Download documents in the builder library
    #[arg(short, long = "builderlibrary")]
    pub builder_library: bool,

    /// Download solution briefs
    #[arg(short, long)]
    pub solutions: bool,

    /// Download event content
    #[arg(short, long)]
    pub events: bool,

    /// Download quick start guides
    #[arg(short = 'q', long = "quick-starts")]
    pub quick_starts: bool,

    /// Download compliance documents
    #[arg(short, long)]
    pub compliance: bool,

    /// Download every category
    #[arg(short, long)]
    pub all: bool,

    /// Overwrite files that already exist
    #[arg(short, long)]
    pub force: bool,

    /// Output directory
    #[arg(short = 'o', long, default_value = "output")]
    pub base_output_dir: String,

    /// Catalog page size
    #[arg(short, long, default_value = "15", value_parser = clap::value_parser!(u32).range(1..))]
    pub page_size: u32,

    /// Stop each category after 5 documents
    #[arg(short, long)]
    pub test_mode: bool,

    /// Print discovered URLs without downloading
    #[arg(short, long)]
    pub list_only: bool,
}

impl Cli {
    /// Categories enabled on the command line, in processing order
    pub fn categories(&self) -> Vec<SourceCategory> {
        if self.all {
            return SourceCategory::ALL.to_vec();
        }

        SourceCategory::ALL
            .into_iter()
            .filter(|category| match category {
                SourceCategory::Documentation => self.documentation,
                SourceCategory::Whitepapers => self.whitepapers,
                SourceCategory::BuilderLibrary => self.builder_library,
                SourceCategory::Solutions => self.solutions,
                SourceCategory::Events => self.events,
                SourceCategory::Quickstarts => self.quick_starts,
                SourceCategory::Compliance => self.compliance,
            })
            .collect()
    }
}
