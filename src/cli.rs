use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bazaar-browse")]
#[command(about = "Category browsing and filter engine for the bazaar classifieds frontend")]
pub struct Cli {
    /// Path to an engine config JSON file (defaults apply when omitted)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run an interactive command REPL against a browse session (default)
    Run {
        /// Path to the category tree JSON (omit for an empty tree)
        #[arg(short, long)]
        categories: Option<String>,
        /// Initial URL to restore the session from
        #[arg(short, long)]
        url: Option<String>,
    },
    /// Execute a single command and print the resulting session snapshot
    Exec {
        /// Path to the category tree JSON
        #[arg(short, long)]
        categories: Option<String>,
        /// Initial URL to restore the session from
        #[arg(short, long)]
        url: Option<String>,
        /// Command to execute (e.g. "category:5", "toggle:condition=new")
        #[arg(short = 'x', long)]
        command: String,
        /// Output file for the snapshot (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Run a command script headlessly; exits non-zero on failed assertions
    Script {
        /// Path to the category tree JSON
        #[arg(short, long)]
        categories: Option<String>,
        /// Initial URL to restore the session from
        #[arg(short, long)]
        url: Option<String>,
        /// Path to the script file
        script: String,
    },
    /// Parse a URL and print the derived state and listings query
    Resolve {
        /// Path to the category tree JSON
        #[arg(short, long)]
        categories: Option<String>,
        /// The URL to parse (e.g. "/category/1?subcategory=10&min_price=500")
        url: String,
    },
}
