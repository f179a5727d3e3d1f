//! Scripted implementations of the service traits.
//!
//! Replies are consumed in call order; a call with nothing scripted fails
//! with [`AppError::Internal`].

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use stockmeta_core::{AppError, AppResult, MediaAsset};
use stockmeta_processing::EncodedPreview;

use crate::services::{CompletionService, TaggingService};

/// A 1x1 preview; scripted services never look inside it
pub fn preview() -> EncodedPreview {
    EncodedPreview {
        width: 1,
        height: 1,
        data: "AAAA".to_string(),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Default)]
pub struct ScriptedCompletion {
    vision: Mutex<VecDeque<AppResult<String>>>,
    text: Mutex<VecDeque<AppResult<String>>>,
    prompts: Mutex<Vec<String>>,
    vision_calls: AtomicUsize,
    text_calls: AtomicUsize,
}

impl ScriptedCompletion {
    pub fn with_vision(replies: impl IntoIterator<Item = AppResult<String>>) -> Self {
        let scripted = Self::default();
        scripted.push_vision(replies);
        scripted
    }

    pub fn with_text(replies: impl IntoIterator<Item = AppResult<String>>) -> Self {
        let scripted = Self::default();
        scripted.push_text(replies);
        scripted
    }

    pub fn push_vision(&self, replies: impl IntoIterator<Item = AppResult<String>>) {
        lock(&self.vision).extend(replies);
    }

    pub fn push_text(&self, replies: impl IntoIterator<Item = AppResult<String>>) {
        lock(&self.text).extend(replies);
    }

    pub fn vision_calls(&self) -> usize {
        self.vision_calls.load(Ordering::SeqCst)
    }

    pub fn text_calls(&self) -> usize {
        self.text_calls.load(Ordering::SeqCst)
    }

    /// Every prompt received, vision and text interleaved in call order
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    pub fn last_prompt(&self) -> Option<String> {
        lock(&self.prompts).last().cloned()
    }

    fn next(queue: &Mutex<VecDeque<AppResult<String>>>, kind: &str) -> AppResult<String> {
        lock(queue)
            .pop_front()
            .unwrap_or_else(|| Err(AppError::Internal(format!("no scripted {} reply", kind))))
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn vision(&self, _preview: &EncodedPreview, prompt: &str, _max_tokens: u32) -> AppResult<String> {
        self.vision_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.prompts).push(prompt.to_string());
        Self::next(&self.vision, "vision")
    }

    async fn text(&self, prompt: &str, _max_tokens: u32) -> AppResult<String> {
        self.text_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.prompts).push(prompt.to_string());
        Self::next(&self.text, "text")
    }
}

pub struct ScriptedTagging {
    replies: Mutex<VecDeque<AppResult<Vec<String>>>>,
    calls: AtomicUsize,
}

impl ScriptedTagging {
    pub fn new(reply: AppResult<Vec<String>>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from([reply])),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaggingService for ScriptedTagging {
    async fn keywords(&self, _asset: &MediaAsset) -> AppResult<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.replies)
            .pop_front()
            .unwrap_or_else(|| Err(AppError::Internal("no scripted tagging reply".to_string())))
    }
}
