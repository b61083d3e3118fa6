//! Telegram bot transport
//!
//! Long-polls getUpdates and dispatches commands: /start, /help, and one
//! dynamic command per configured event. Reports go out as a photo plus a
//! Markdown table; pipeline errors become a user-visible error message and
//! never take the polling loop down.

use crate::client::PolymarketClient;
use crate::config::Config;
use crate::error::{BotError, Result};
use crate::report::{Report, ReportGenerator};
use reqwest::multipart;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// Telegram bot serving report commands
pub struct TelegramBot {
    http: Client,
    bot_token: String,
    poll_timeout_secs: u64,
    config: Config,
    generator: ReportGenerator<PolymarketClient>,
    last_update_id: i64,
}

#[derive(Debug, Deserialize)]
struct GetUpdatesResponse {
    #[allow(dead_code)]
    ok: bool,
    #[serde(default)]
    result: Vec<TelegramUpdate>,
}

#[derive(Debug, Deserialize)]
struct TelegramUpdate {
    update_id: i64,
    message: Option<TelegramMessage>,
}

#[derive(Debug, Deserialize)]
struct TelegramMessage {
    chat: TelegramChat,
    from: Option<TelegramUser>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TelegramChat {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct TelegramUser {
    id: i64,
    username: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest {
    chat_id: i64,
    text: String,
    parse_mode: String,
    disable_web_page_preview: bool,
}

impl TelegramBot {
    pub fn new(config: Config, generator: ReportGenerator<PolymarketClient>) -> Result<Self> {
        let tg = config
            .telegram
            .as_ref()
            .ok_or_else(|| BotError::Telegram("telegram section not configured".to_string()))?;

        Ok(Self {
            http: Client::new(),
            bot_token: tg.bot_token.clone(),
            poll_timeout_secs: tg.poll_timeout_secs,
            config,
            generator,
            last_update_id: 0,
        })
    }

    /// Poll updates forever, handling one message at a time
    pub async fn run(&mut self) {
        info!("Telegram bot started, polling for commands");

        loop {
            match self.poll_updates().await {
                Ok(updates) => {
                    for update in updates {
                        self.last_update_id = update.update_id + 1;
                        if let Some(msg) = update.message {
                            self.handle_message(&msg).await;
                        }
                    }
                }
                Err(e) => {
                    error!("Failed to poll Telegram updates: {}", e);
                    tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;
                }
            }
        }
    }

    async fn poll_updates(&self) -> Result<Vec<TelegramUpdate>> {
        let url = format!(
            "https://api.telegram.org/bot{}/getUpdates?offset={}&timeout={}",
            self.bot_token, self.last_update_id, self.poll_timeout_secs
        );

        let response: GetUpdatesResponse = self.http.get(&url).send().await?.json().await?;
        Ok(response.result)
    }

    async fn handle_message(&self, msg: &TelegramMessage) {
        let Some(text) = msg.text.as_deref() else {
            return;
        };
        let text = text.trim();
        let username = msg
            .from
            .as_ref()
            .and_then(|u| u.username.as_deref())
            .unwrap_or("Unknown");

        // Ignore anything that is not a command to avoid spamming groups
        let Some(stripped) = text.strip_prefix('/') else {
            info!("Ignored message from {}: {}", username, text);
            return;
        };
        let cmd = stripped
            .split_whitespace()
            .next()
            .unwrap_or("")
            .split('@')
            .next()
            .unwrap_or("");

        let user_id = msg.from.as_ref().map(|u| u.id).unwrap_or(0);
        info!("COMMAND: /{} | USER: {} ({})", cmd, username, user_id);

        match cmd {
            "start" => self.send_welcome(msg.chat.id).await,
            "help" => self.send_help(msg.chat.id).await,
            _ => self.handle_event_command(msg.chat.id, cmd).await,
        }
    }

    async fn handle_event_command(&self, chat_id: i64, command: &str) {
        let Some(event_url) = self.config.event_url(command) else {
            self.send_text(
                chat_id,
                &format!("❓ Unknown command: /{}\nUse /help for available markets.", command),
            )
            .await;
            return;
        };

        self.send_text(
            chat_id,
            "🔍 *Fetching latest odds from Polymarket...*\nPlease wait while I generate the chart.",
        )
        .await;

        match self.generator.generate(event_url).await {
            Ok(Report {
                image: Some(png),
                text,
            }) => {
                info!("Report generated for /{}, sending", command);
                self.send_photo(chat_id, png).await;
                self.send_text(chat_id, &text).await;
            }
            Ok(Report { image: None, text }) => {
                warn!("Report for /{} degraded to message: {}", command, text);
                self.send_text(chat_id, &format!("⚠️ Error: {}", text)).await;
            }
            Err(e) => {
                error!("Report generation failed for /{}: {}", command, e);
                self.send_text(chat_id, "⚠️ An unexpected error occurred. Try again later.")
                    .await;
            }
        }
    }

    async fn send_welcome(&self, chat_id: i64) {
        let welcome = "👋 *Welcome to PolyBot!* 🔮\n\n\
            I am your personal analyst for *Polymarket* prediction markets. \
            I track real-time odds for major geopolitical and economic events.\n\n\
            📉 *What I do:*\n\
            • Fetch live probability charts\n\
            • Compare odds: Today vs Next Week vs Month End\n\
            • Generate instant analysis tables\n\n\
            🚀 *Get Started:*\n\
            Type /help to see the list of tracked markets and generate your first report!";
        self.send_text(chat_id, welcome).await;
    }

    async fn send_help(&self, chat_id: i64) {
        if self.config.events.is_empty() {
            self.send_text(chat_id, "⚠️ No events configured.").await;
            return;
        }

        let mut events_list = String::new();
        for (command, url) in &self.config.events {
            // Escape underscores so Markdown does not italicize the command
            let clean_cmd = command.replace('_', "\\_");
            events_list.push_str(&format!("🔹 /{}\n   🔗 {}\n\n", clean_cmd, url));
        }

        let help = format!(
            "📊 *Available Markets*\n\
             Select a command below to generate a real-time odds report:\n\n\
             {}───────────────────\n\
             💡 New trackers are added through the `[events]` config table.",
            events_list
        );
        self.send_text(chat_id, &help).await;
    }

    async fn send_text(&self, chat_id: i64, text: &str) {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);
        let request = SendMessageRequest {
            chat_id,
            text: text.to_string(),
            parse_mode: "Markdown".to_string(),
            disable_web_page_preview: true,
        };

        if let Err(e) = self.http.post(&url).json(&request).send().await {
            error!("Failed to send Telegram message: {}", e);
        }
    }

    async fn send_photo(&self, chat_id: i64, png: Vec<u8>) {
        let url = format!("https://api.telegram.org/bot{}/sendPhoto", self.bot_token);
        let part = match multipart::Part::bytes(png)
            .file_name("report.png")
            .mime_str("image/png")
        {
            Ok(p) => p,
            Err(e) => {
                error!("Failed to build photo part: {}", e);
                return;
            }
        };
        let form = multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .part("photo", part);

        if let Err(e) = self.http.post(&url).multipart(form).send().await {
            error!("Failed to send Telegram photo: {}", e);
        }
    }
}
