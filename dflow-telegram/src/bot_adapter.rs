//! Wraps teloxide::Bot and implements [`dflow_core::Bot`]: executes each send operation as
//! one Bot API call. Tests substitute another Bot impl that records operations.

use async_trait::async_trait;
use dflow_core::{Bot as CoreBot, DflowError, MediaItem, MediaKind, MediaRef, Result, SendOperation};
use teloxide::prelude::*;
use teloxide::types::{
    InputFile, InputMedia, InputMediaAudio, InputMediaDocument, InputMediaPhoto, InputMediaVideo,
};
use tracing::{debug, error};

/// Thin wrapper around teloxide::Bot that implements dflow-core's Bot trait.
#[derive(Clone)]
pub struct TelegramBotAdapter {
    bot: teloxide::Bot,
}

fn bot_error(operation: &SendOperation, e: teloxide::RequestError) -> DflowError {
    error!(
        error = %e,
        operation = operation.name(),
        chat_id = operation.chat_id().0,
        "Telegram request failed"
    );
    DflowError::Bot(format!("{} failed: {}", operation.name(), e))
}

/// Opens local files here so the handle lives exactly as long as the request that
/// consumes it.
async fn input_file(media: &MediaRef) -> Result<InputFile> {
    let file = match media {
        MediaRef::Url(url) => InputFile::url(url.clone()),
        MediaRef::FileId(id) => InputFile::file_id(id.clone()),
        MediaRef::Path(path) => {
            let handle = tokio::fs::File::open(path).await.map_err(|e| {
                DflowError::InvalidAttachment(format!("Cannot open {}: {}", path.display(), e))
            })?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "file".to_string());
            InputFile::read(handle).file_name(name)
        }
    };
    Ok(file)
}

async fn input_media(item: &MediaItem) -> Result<InputMedia> {
    let file = input_file(&item.media).await?;
    let media = match item.kind {
        MediaKind::Image => {
            let mut m = InputMediaPhoto::new(file);
            m.caption = item.caption.clone();
            InputMedia::Photo(m)
        }
        MediaKind::Video => {
            let mut m = InputMediaVideo::new(file);
            m.caption = item.caption.clone();
            InputMedia::Video(m)
        }
        MediaKind::Document => {
            let mut m = InputMediaDocument::new(file);
            m.caption = item.caption.clone();
            InputMedia::Document(m)
        }
        MediaKind::Audio => {
            let mut m = InputMediaAudio::new(file);
            m.caption = item.caption.clone();
            InputMedia::Audio(m)
        }
    };
    Ok(media)
}

impl TelegramBotAdapter {
    /// Creates an adapter from an existing teloxide Bot.
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }

    /// Returns the underlying teloxide::Bot for direct API use when needed.
    pub fn inner(&self) -> &teloxide::Bot {
        &self.bot
    }

    async fn send_media(
        &self,
        operation: &SendOperation,
        chat_id: ChatId,
        item: &MediaItem,
    ) -> Result<()> {
        let file = input_file(&item.media).await?;
        let caption = item.caption.clone();
        let sent = match item.kind {
            MediaKind::Image => {
                let mut req = self.bot.send_photo(chat_id, file);
                req.caption = caption;
                req.await
            }
            MediaKind::Video => {
                let mut req = self.bot.send_video(chat_id, file);
                req.caption = caption;
                req.await
            }
            MediaKind::Document => {
                let mut req = self.bot.send_document(chat_id, file);
                req.caption = caption;
                req.await
            }
            MediaKind::Audio => {
                let mut req = self.bot.send_audio(chat_id, file);
                req.caption = caption;
                req.await
            }
        };
        sent.map(|_| ()).map_err(|e| bot_error(operation, e))
    }
}

#[async_trait]
impl CoreBot for TelegramBotAdapter {
    async fn execute(&self, operation: &SendOperation) -> Result<()> {
        debug!(
            operation = operation.name(),
            chat_id = operation.chat_id().0,
            "Executing send operation"
        );

        match operation {
            SendOperation::Media { chat_id, item } => {
                self.send_media(operation, *chat_id, item).await?
            }
            SendOperation::Location {
                chat_id,
                latitude,
                longitude,
            } => {
                self.bot
                    .send_location(*chat_id, *latitude, *longitude)
                    .await
                    .map_err(|e| bot_error(operation, e))?;
            }
            SendOperation::MediaGroup { chat_id, items } => {
                // Every member is opened before the call; all handles drop with `media`.
                let mut media = Vec::with_capacity(items.len());
                for item in items {
                    media.push(input_media(item).await?);
                }
                self.bot
                    .send_media_group(*chat_id, media)
                    .await
                    .map_err(|e| bot_error(operation, e))?;
            }
            SendOperation::Message {
                chat_id,
                text,
                reply_markup,
            } => {
                let mut req = self.bot.send_message(*chat_id, text.clone());
                req.reply_markup = reply_markup.clone();
                req.await.map_err(|e| bot_error(operation, e))?;
            }
        }
        Ok(())
    }
}
