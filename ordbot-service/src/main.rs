//! ordbot service
//!
//! CLI front end for the order-support agent: seeds a demo order store,
//! connects the OpenAI client, and runs the dispatch loop either for a
//! single message or as an interactive prompt.

use anyhow::Result;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use ordbot_chat::{ChatLoopConfig, OrderChatLoop};
use ordbot_llm::openai::{model_from_env, OpenAiClient};
use ordbot_store::{OrderStore, ProductOrder, PREPARING, SHIPPING};

#[derive(Parser, Debug)]
#[command(name = "ordbot-service")]
#[command(about = "Order-support agent backed by an LLM tool-calling loop")]
struct Args {
    /// One-shot message; omit for an interactive prompt
    message: Option<String>,

    /// Model to use (defaults to CHAT_TOOL_MODEL / CHAT_MODEL / gpt-4o-mini)
    #[arg(short, long)]
    model: Option<String>,

    /// Override the API base URL
    #[arg(long)]
    base_url: Option<String>,
}

fn seed_demo_store() -> Arc<RwLock<OrderStore>> {
    let mut store = OrderStore::new();
    store.save(ProductOrder::new(
        "1000000",
        "MacBook Air",
        "Yeouido-dong, Yeongdeungpo-gu, Seoul",
        SHIPPING,
    ));
    store.save(ProductOrder::new(
        "1000001",
        "iPhone",
        "Yeoksam-dong, Gangnam-gu, Seoul",
        PREPARING,
    ));
    Arc::new(RwLock::new(store))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from /etc/ordbot/environment (if exists)
    ordbot_core::config::load_environment();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ordbot_service=info".parse()?)
                .add_directive("ordbot_chat=info".parse()?)
                .add_directive("ordbot_llm=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let mut client = OpenAiClient::from_env()?;
    if let Some(ref url) = args.base_url {
        client = client.with_base_url(url);
    }

    let model = args.model.unwrap_or_else(model_from_env);
    info!("Using model: {}", model);

    let store = seed_demo_store();
    let config = ChatLoopConfig {
        model,
        ..ChatLoopConfig::default()
    };
    let mut chat_loop = OrderChatLoop::new(Arc::new(client), store.clone(), config);

    if let Some(message) = args.message {
        let result = chat_loop.process_message(&message).await?;
        info!(
            tool_calls = result.tool_calls_made,
            nudges = result.corrective_nudges,
            "Turn complete"
        );
        println!("{}", result.final_text);
        return Ok(());
    }

    // Interactive prompt
    println!("ordbot ready. Type a request, or 'quit' to exit.");
    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }

        match chat_loop.process_message(line).await {
            Ok(result) => {
                println!("{}", result.final_text);
                if result.tool_calls_made > 0 {
                    let store = store.read().await;
                    println!(
                        "[orders: {}]",
                        serde_json::to_string(&store.list_all())?
                    );
                }
            }
            Err(e) => {
                eprintln!("error: {}", e);
            }
        }
    }

    Ok(())
}
