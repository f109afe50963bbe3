//! 命令行入口
//!
//! 全局参数覆盖配置文件和环境变量，子命令委托给 `App`。

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;
use crate::orchestrator::{App, BatchFailure};
use crate::utils::logging;

/// 从记事本获取 Kontr 统计并转换为 JSON / CSV
#[derive(Parser, Debug)]
#[command(name = "notepad-stats", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// 全局参数
#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// 配置文件 (默认 $HOME/.config/notepad-stats/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// 记事本服务地址
    #[arg(short = 'U', long, global = true)]
    pub url: Option<String>,

    /// 访问令牌
    #[arg(short = 'T', long, global = true)]
    pub token: Option<String>,

    /// 课程代码
    #[arg(short = 'C', long, global = true)]
    pub course: Option<String>,

    /// 院系 ID
    #[arg(long, global = true)]
    pub faculty_id: Option<u32>,

    /// 记事本格式
    #[arg(long, global = true)]
    pub parser: Option<String>,

    /// 结果目录 (默认当前目录)
    #[arg(long, global = true)]
    pub results: Option<PathBuf>,

    /// 不发送请求
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// 额外保存不带时间戳的副本
    #[arg(long, global = true)]
    pub without_timestamp: bool,

    /// 日志级别
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

impl GlobalArgs {
    /// 命令行参数覆盖配置
    pub fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.url {
            config.muni.url = url.clone();
        }
        if let Some(token) = &self.token {
            config.muni.token = token.clone();
        }
        if let Some(course) = &self.course {
            config.muni.course = course.clone();
        }
        if let Some(faculty_id) = self.faculty_id {
            config.muni.faculty_id = faculty_id;
        }
        if let Some(parser) = &self.parser {
            config.parser = parser.clone();
        }
        if let Some(results) = &self.results {
            config.results = Some(results.clone());
        }
        if let Some(level) = &self.log_level {
            config.log_level = Some(level.clone());
        }
        config.dry_run |= self.dry_run;
        config.without_timestamp |= self.without_timestamp;
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 获取记事本并保存原始 XML
    Fetch {
        /// 记事本代号
        #[arg(required = true)]
        notepads: Vec<String>,
    },
    /// 解析 XML 结果为 JSON
    Parse {
        /// 文件匹配模式 (默认全部)
        patterns: Vec<String>,
    },
    /// 将 JSON 结果转换为 CSV
    Csv { patterns: Vec<String> },
    /// 列出结果
    List {
        patterns: Vec<String>,
        /// 按名称和扩展名分组显示
        #[arg(short = 't', long)]
        tree: bool,
    },
    /// 删除旧结果
    Clean {
        /// 文件匹配模式 (至少一个)
        #[arg(required = true)]
        patterns: Vec<String>,
        /// 保留最新的 limit + 1 个
        #[arg(short = 'l', long, default_value_t = 1)]
        limit: usize,
    },
    /// 将每组最新的结果另存为 name.ext
    DumpLatest,
}

/// 执行命令
pub async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.global.config.as_deref()).context("无法加载配置")?;
    cli.global.apply(&mut config);
    logging::init(config.log_level.as_deref());

    let mut app = App::initialize(config).context("初始化失败")?;
    let root = app.store().root().display().to_string();

    match cli.command {
        Command::Fetch { notepads } => {
            let items = app.fetch(&notepads).await.context("获取记事本失败")?;
            println!("获取成功, 结果保存在 {}", root);
            for (i, item) in items.iter().enumerate() {
                println!("{:3}  {}", i, item);
            }
        }
        Command::Parse { patterns } => {
            let report = app.parse(&patterns);
            println!("解析完成, 结果保存在 {}", root);
            for parsed in &report.succeeded {
                println!("记事本: [{:>20}] -> {}", parsed.source, parsed.item);
                for (i, record) in parsed.records.iter().enumerate() {
                    println!("- {:03}. {}  提交: {:2}", i, record.id, record.submissions.len());
                }
            }
            print_failures(&report.failed);
        }
        Command::Csv { patterns } => {
            let report = app.convert_to_csv(&patterns);
            println!("转换完成, 结果保存在 {}", root);
            for (i, item) in report.succeeded.iter().enumerate() {
                println!("{:3}  {:>25}", i, item.to_string());
            }
            print_failures(&report.failed);
        }
        Command::List { patterns, tree } => {
            if tree {
                for (name, extensions) in app.tree(&patterns) {
                    println!("- {}", name);
                    for (ext, items) in extensions {
                        println!("\t [{}]", ext);
                        for (i, item) in items.iter().enumerate() {
                            println!("\t\t {:3} - {}", i, item);
                        }
                    }
                }
            } else {
                for (i, item) in app.list(&patterns).iter().enumerate() {
                    println!("{} - {}", i, item);
                }
            }
        }
        Command::Clean { patterns, limit } => {
            let report = app.clean(&patterns, limit);
            println!("已删除:");
            for (i, item) in report.succeeded.iter().enumerate() {
                println!("{} - {}", i, item);
            }
            print_failures(&report.failed);
        }
        Command::DumpLatest => {
            let report = app.dump_latest();
            for item in &report.succeeded {
                println!("{} -> {}.{}", item, item.name, item.extension);
            }
            print_failures(&report.failed);
        }
    }

    Ok(())
}

fn print_failures(failed: &[BatchFailure]) {
    if failed.is_empty() {
        return;
    }
    eprintln!("失败 {} 项:", failed.len());
    for failure in failed {
        eprintln!("  {}: {}", failure.item, failure.error);
    }
}
