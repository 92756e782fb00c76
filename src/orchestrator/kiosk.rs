//! 扫码终端 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：创建 HTTP 客户端、打开本地存储、恢复表格
//! 2. **逐行处理**：读取扫描枪/键盘输入
//! 3. **命令分发**：清空、导出、重新打印
//! 4. **表格输出**：每次变化后重新输出表格
//!
//! ## 并发模型
//!
//! - 同一时间最多一个网络任务（查询或打印）在进行
//! - 任务进行中继续读取输入：`:list`、`:export`、`:clear`、`:help`、`:quit` 立即执行，
//!   新的扫描和 `:retry` 排队，按输入顺序依次处理
//! - 查询完成后新行立即以 `Printing...` 输出，打印结果返回后原地更新

use std::collections::VecDeque;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use crate::clients::{build_http_client, LookupClient, PrintClient};
use crate::config::Config;
use crate::error::ApiError;
use crate::models::{LookupData, PrintStatus, ProductRecord};
use crate::orchestrator::command::{Command, HELP_TEXT};
use crate::orchestrator::render::render_table;
use crate::services::{export_products, TableStore};
use crate::storage::LocalStore;
use crate::utils::logging::log_startup;
use crate::workflow::{RetryOutcome, ScanFlow, ScanInput, SubmitOutcome};

type Flow = ScanFlow<LookupClient, PrintClient>;

/// 进行中的网络任务
type Job = Pin<Box<dyn Future<Output = JobDone>>>;

/// 网络任务的结果，回到主循环后再写入表格
enum JobDone {
    Looked {
        input: ScanInput,
        result: Result<LookupData, ApiError>,
    },
    Printed {
        index: usize,
        record: ProductRecord,
        status: Option<PrintStatus>,
    },
}

enum Event {
    Line(std::io::Result<Option<String>>),
    Done(JobDone),
}

/// 应用主结构
pub struct App {
    config: Config,
    flow: Arc<Flow>,
    table: TableStore,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        let http = build_http_client(&config).context("无法创建 HTTP 客户端")?;

        let lookup = LookupClient::new(http.clone(), &config);
        let printer = config
            .print_enabled
            .then(|| PrintClient::new(http, &config));
        let flow = Arc::new(ScanFlow::new(lookup, printer));

        let store = LocalStore::open(&config.storage_dir)
            .with_context(|| format!("无法打开存储目录: {}", config.storage_dir))?;
        let table = TableStore::load(store);

        log_startup(&config, table.len());

        Ok(Self { config, flow, table })
    }

    pub fn table(&self) -> &TableStore {
        &self.table
    }

    /// 当前表格的文本形式
    pub fn render(&self) -> String {
        render_table(self.table.records(), self.flow.print_enabled())
    }

    /// 从标准输入读取，直到 EOF 或 `:quit`
    pub async fn run(&mut self) -> Result<()> {
        println!("{}", HELP_TEXT);
        self.print_table();
        self.run_with(BufReader::new(tokio::io::stdin())).await
    }

    /// 处理任意输入源
    ///
    /// 输入结束后会等排队的扫描处理完再返回；`:quit` 立即返回，
    /// 放弃进行中的请求（该行保持 `Printing...`，可在重启后 `:retry`）。
    pub async fn run_with<R>(&mut self, reader: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        let mut queue: VecDeque<Command> = VecDeque::new();
        let mut in_flight: Option<Job> = None;
        let mut input_open = true;

        loop {
            if in_flight.is_none() {
                if let Some(command) = queue.pop_front() {
                    in_flight = self.start(command);
                    continue;
                }
                if !input_open {
                    break;
                }
            }

            let event = tokio::select! {
                line = lines.next_line(), if input_open => Event::Line(line),
                done = wait_job(&mut in_flight), if in_flight.is_some() => Event::Done(done),
                else => break,
            };

            match event {
                Event::Line(line) => match line.context("读取输入失败")? {
                    Some(line) => match Command::parse(&line) {
                        Command::Quit => {
                            if in_flight.is_some() || !queue.is_empty() {
                                warn!("⚠️ 放弃进行中的请求，{} 条扫描未处理", queue.len());
                            }
                            break;
                        }
                        command if command.needs_network() => queue.push_back(command),
                        command => self.run_local(command),
                    },
                    None => input_open = false,
                },
                Event::Done(done) => in_flight = self.complete(done),
            }
        }

        info!("👋 退出，共 {} 条记录", self.table.len());
        Ok(())
    }

    /// 执行一条命令并等待其完成，返回是否继续
    pub async fn handle(&mut self, command: Command) -> bool {
        if command == Command::Quit {
            return false;
        }
        if !command.needs_network() {
            self.run_local(command);
            return true;
        }

        let mut job = self.start(command);
        while let Some(pending) = job {
            let done = pending.await;
            job = self.complete(done);
        }
        true
    }

    /// 发起扫描或重新打印的第一个网络步骤
    fn start(&mut self, command: Command) -> Option<Job> {
        match command {
            Command::Scan(raw) => {
                let input = ScanInput::parse(&raw)?;
                let flow = Arc::clone(&self.flow);
                Some(Box::pin(async move {
                    let result = flow.lookup(&input).await;
                    JobDone::Looked { input, result }
                }))
            }
            Command::Retry(row) => {
                // 行号从 1 开始，0 视为不存在的行
                let index = row.checked_sub(1).unwrap_or(usize::MAX);
                match self.flow.begin_retry(&mut self.table, index) {
                    Ok(record) => {
                        self.print_table();
                        Some(self.print_job(index, record))
                    }
                    Err(RetryOutcome::PrintingDisabled) => {
                        println!("⚠️ 打印已关闭");
                        None
                    }
                    Err(_) => {
                        println!("⚠️ 没有第 {} 行", row);
                        None
                    }
                }
            }
            other => {
                self.run_local(other);
                None
            }
        }
    }

    /// 把网络步骤的结果写回表格，必要时返回下一步
    fn complete(&mut self, done: JobDone) -> Option<Job> {
        match done {
            JobDone::Looked { input, result } => {
                match self.flow.accept_lookup(&mut self.table, &input, result) {
                    SubmitOutcome::Ignored => None,
                    SubmitOutcome::LookupFailed { code, reason } => {
                        println!("❌ 未找到商品 {}: {}", code, reason);
                        None
                    }
                    outcome @ SubmitOutcome::Added { .. } => {
                        // 先展示 Printing... 行，再发起打印
                        self.print_table();
                        let index = outcome.pending_print()?;
                        let record = self.table.get(index).cloned()?;
                        Some(self.print_job(index, record))
                    }
                }
            }
            JobDone::Printed {
                index,
                record,
                status,
            } => {
                let status = status?;
                if self.flow.apply_print(&mut self.table, index, &record, status) {
                    self.print_table();
                }
                None
            }
        }
    }

    fn print_job(&self, index: usize, record: ProductRecord) -> Job {
        let flow = Arc::clone(&self.flow);
        Box::pin(async move {
            let status = flow.print(index, &record).await;
            JobDone::Printed {
                index,
                record,
                status,
            }
        })
    }

    fn run_local(&mut self, command: Command) {
        match command {
            Command::Clear => {
                if let Err(e) = self.table.clear() {
                    warn!("⚠️ 清空存储失败: {}", e);
                }
                println!("🗑️ 表格已清空");
            }
            Command::Export => self.export(),
            Command::List => self.print_table(),
            Command::Help => println!("{}", HELP_TEXT),
            Command::Unknown(text) => println!("⚠️ 未知命令: {} (输入 :help 查看帮助)", text),
            Command::Scan(_) | Command::Retry(_) | Command::Quit => {}
        }
    }

    fn export(&self) {
        let today = chrono::Utc::now().date_naive();
        match export_products(
            Path::new(&self.config.export_dir),
            self.table.records(),
            self.flow.print_enabled(),
            today,
        ) {
            Ok(Some(path)) => println!("📊 已导出: {}", path.display()),
            Ok(None) => println!("表格为空，无需导出"),
            Err(e) => error!("❌ 导出失败: {}", e),
        }
    }

    fn print_table(&self) {
        let text = self.render();
        if !text.is_empty() {
            print!("{}", text);
        }
    }
}

async fn wait_job(job: &mut Option<Job>) -> JobDone {
    match job {
        Some(pending) => pending.await,
        None => std::future::pending().await,
    }
}
