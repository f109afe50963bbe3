use anyhow::Result;
use clap::Parser;
use notepad_stats::cli::{self, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令行并运行
    let cli = Cli::parse();
    cli::run(cli).await
}
