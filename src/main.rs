//! 客服智能体命令行
//!
//! 逐行读取标准输入，每行作为一条用户消息交给编排器。
//! 命令：`/thread <id>` 切换会话线程，`/send` 确认发送订单邮件，`/quit` 退出。

use anyhow::Context;
use support_agent::agent::{create_orchestrator, resolve_thread_id};
use support_agent::core::NotificationOutcome;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    support_agent::observability::init();

    let config_path = std::env::args().nth(1).map(Into::into);
    let orchestrator = create_orchestrator(config_path).await;
    let mut thread_id = resolve_thread_id(None);

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    stdout
        .write_all(format!("thread: {thread_id}\n> ").as_bytes())
        .await?;
    stdout.flush().await?;

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let line = line.trim();
        let reply = match line.split_once(' ').map_or((line, ""), |(c, rest)| (c, rest.trim())) {
            ("/quit", _) => break,
            ("/thread", id) => {
                thread_id = resolve_thread_id(Some(id));
                format!("thread: {thread_id}")
            }
            ("/send", _) => match orchestrator.confirm_notification(&thread_id).await {
                Ok(NotificationOutcome::Sent { order_id, email }) => format!(
                    "订单 {order_id} 的信息已发送至 {}",
                    email.as_deref().unwrap_or("客户邮箱")
                ),
                Ok(NotificationOutcome::NothingPending) => "当前没有待发送的订单邮件。".to_string(),
                Err(e) => format!("发送失败：{e}"),
            },
            _ => {
                let outcome = orchestrator.process_message(line, &thread_id).await;
                if let Some(note) = &outcome.error_note {
                    tracing::debug!(intent = %outcome.intent, "note: {}", note);
                }
                outcome.response_text
            }
        };

        stdout.write_all(format!("{reply}\n> ").as_bytes()).await?;
        stdout.flush().await?;
    }

    Ok(())
}
