use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "report-cli")]
#[command(about = "Query a running build report server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:38000")]
    url: String,

    /// Report id, or `latest`.
    #[arg(short, long, default_value = "latest")]
    report: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the full report
    Report,
    /// Print summary fields
    Summary,
    /// List build steps
    Steps,
    /// Show the packed-asset breakdown
    Assets {
        /// Tree path, e.g. `Textures/UI`
        path: Option<String>,
        #[arg(short, long, default_value_t = 0)]
        depth: u32,
    },
    /// Show build output files
    Files {
        path: Option<String>,
        #[arg(short, long, default_value_t = 0)]
        depth: u32,
    },
    /// List, show, or invoke appendices
    Appendix {
        /// Appendix type
        kind: String,
        index: Option<usize>,
        /// Method to invoke on the instance (requires an index)
        method: Option<String>,
        /// Input passed to the method
        #[arg(short, long)]
        input: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = format!("{}/unity/build-report/{}", cli.url.trim_end_matches('/'), cli.report);

    let res = match cli.command {
        Commands::Report => client.get(format!("{base}/report")).send().await?,
        Commands::Summary => client.get(format!("{base}/summary")).send().await?,
        Commands::Steps => client.get(format!("{base}/steps")).send().await?,
        Commands::Assets { path, depth } => {
            client
                .get(tree_url(&base, "assets", path.as_deref()))
                .query(&[("depth", depth)])
                .send()
                .await?
        }
        Commands::Files { path, depth } => {
            client
                .get(tree_url(&base, "files", path.as_deref()))
                .query(&[("depth", depth)])
                .send()
                .await?
        }
        Commands::Appendix {
            kind,
            index,
            method,
            input,
        } => match (index, method) {
            (Some(index), Some(method)) => {
                client
                    .post(format!("{base}/appendices/{kind}/{index}/{method}"))
                    .body(input.unwrap_or_default())
                    .send()
                    .await?
            }
            (Some(index), None) => {
                client
                    .get(format!("{base}/appendices/{kind}/{index}"))
                    .send()
                    .await?
            }
            (None, None) => client.get(format!("{base}/appendices/{kind}")).send().await?,
            (None, Some(_)) => return Err("a method needs an appendix index".into()),
        },
    };

    print_response(res).await
}

fn tree_url(base: &str, kind: &str, path: Option<&str>) -> String {
    match path.map(|p| p.trim_matches('/')).filter(|p| !p.is_empty()) {
        Some(path) => format!("{base}/{kind}/{path}"),
        None => format!("{base}/{kind}"),
    }
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: report server returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
