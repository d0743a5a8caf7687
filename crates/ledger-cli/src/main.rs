use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Number;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "ledger-cli")]
#[command(about = "CLI client for the proof-of-work ledger node")]
struct Cli {
    /// Node base URL (e.g. http://127.0.0.1:5000)
    #[arg(long, global = true, default_value = "http://127.0.0.1:5000")]
    node: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mine a block on the node
    Mine,
    /// Print the node's full chain
    Chain,
    /// Submit a transaction
    Submit {
        /// Sender
        #[arg(long)]
        sender: String,
        /// Recipient
        #[arg(long)]
        recipient: String,
        /// Amount (integer or decimal, e.g. 5 or 2.5)
        #[arg(long)]
        amount: Number,
    },
    /// Show the settled balance of an address
    Balance {
        address: String,
    },
    /// Register peers with the node
    Register {
        /// Peer addresses, e.g. http://127.0.0.1:5001
        #[arg(required = true)]
        peers: Vec<String>,
    },
    /// Ask the node to resolve forks against its peers
    Resolve,
}

#[derive(Serialize)]
struct Tx {
    sender: String,
    recipient: String,
    amount: Number,
}

#[derive(Serialize)]
struct Nodes {
    nodes: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .pretty()
        .init();

    let cli = Cli::parse();
    let node = cli.node.trim_end_matches('/');
    let client = reqwest::Client::new();

    let req = match cli.cmd {
        Command::Mine => client.get(format!("{node}/mine")),
        Command::Chain => client.get(format!("{node}/chain")),
        Command::Submit {
            sender,
            recipient,
            amount,
        } => client
            .post(format!("{node}/transactions/new"))
            .json(&Tx {
                sender,
                recipient,
                amount,
            }),
        Command::Balance { address } => client.get(format!("{node}/balance/{address}")),
        Command::Register { peers } => client
            .post(format!("{node}/nodes/register"))
            .json(&Nodes { nodes: peers }),
        Command::Resolve => client.get(format!("{node}/nodes/resolve")),
    };

    debug!(?req, "sending request");
    let res = req.send().await?;
    let status = res.status();
    let body = res.text().await?;
    println!("status: {}", status);
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{body}"),
    }
    Ok(())
}
