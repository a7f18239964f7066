use anyhow::Result;
use inquire::{Confirm, CustomType, Text};

/// Prompting boundary used by the wizard, so choice flows stay independent
/// of the concrete terminal library.
pub trait PromptDriver {
    fn ask_string(&self, title: &str, help: &str, default: &str) -> Result<String>;
    fn ask_bool(&self, title: &str, help: &str, default: bool) -> Result<bool>;
    fn ask_u64(
        &self,
        title: &str,
        help: &str,
        default: u64,
        min: Option<u64>,
        max: Option<u64>,
    ) -> Result<u64>;
    fn ask_f64(
        &self,
        title: &str,
        help: &str,
        default: f64,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Result<f64>;
}

pub struct InquireDriver;

impl PromptDriver for InquireDriver {
    fn ask_string(&self, title: &str, help: &str, default: &str) -> Result<String> {
        let mut prompt = Text::new(title).with_default(default);
        if !help.is_empty() {
            prompt = prompt.with_help_message(help);
        }
        Ok(prompt.prompt()?)
    }

    fn ask_bool(&self, title: &str, help: &str, default: bool) -> Result<bool> {
        let mut prompt = Confirm::new(title).with_default(default);
        if !help.is_empty() {
            prompt = prompt.with_help_message(help);
        }
        Ok(prompt.prompt()?)
    }

    fn ask_u64(
        &self,
        title: &str,
        help: &str,
        default: u64,
        min: Option<u64>,
        max: Option<u64>,
    ) -> Result<u64> {
        loop {
            let mut prompt = CustomType::<u64>::new(title).with_default(default);
            if !help.is_empty() {
                prompt = prompt.with_help_message(help);
            }
            let answer = prompt.prompt()?;
            if let Some(lo) = min {
                if answer < lo {
                    eprintln!("✗ must be >= {lo}");
                    continue;
                }
            }
            if let Some(hi) = max {
                if answer > hi {
                    eprintln!("✗ must be <= {hi}");
                    continue;
                }
            }
            return Ok(answer);
        }
    }

    fn ask_f64(
        &self,
        title: &str,
        help: &str,
        default: f64,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Result<f64> {
        loop {
            let mut prompt = CustomType::<f64>::new(title).with_default(default);
            if !help.is_empty() {
                prompt = prompt.with_help_message(help);
            }
            let answer = prompt.prompt()?;
            if let Some(lo) = min {
                if answer < lo {
                    eprintln!("✗ must be >= {lo}");
                    continue;
                }
            }
            if let Some(hi) = max {
                if answer > hi {
                    eprintln!("✗ must be <= {hi}");
                    continue;
                }
            }
            return Ok(answer);
        }
    }
}
