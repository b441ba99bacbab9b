use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use gamewise_core::{GameId, ReasoningEngine, SolverError, SolverQuery};

use crate::io::DialogueIo;
use crate::llm::LlmClient;
use crate::prompts::{QUESTION_INSTRUCTION, RECOMMENDATION_INSTRUCTION};

#[derive(Clone, Debug)]
pub(crate) struct LlmCall {
    pub instruction: String,
    pub utterance: String,
}

/// Replays canned replies in call order. In routed mode only extraction calls consume the
/// queue; questions and recommendations are synthesised from the utterance.
pub(crate) struct ScriptedLlm {
    replies: Mutex<VecDeque<String>>,
    routed: bool,
    calls: Mutex<Vec<LlmCall>>,
}

impl ScriptedLlm {
    pub fn new<const N: usize>(replies: [&str; N]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|reply| reply.to_string()).collect()),
            routed: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn routed<const N: usize>(extractions: [&str; N]) -> Self {
        Self { routed: true, ..Self::new(extractions) }
    }

    pub fn calls(&self) -> Vec<LlmCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    pub fn calls_with(&self, instruction: &str) -> Vec<LlmCall> {
        self.calls().into_iter().filter(|call| call.instruction == instruction).collect()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, instruction: &str, utterance: &str) -> Result<String> {
        self.calls
            .lock()
            .map_err(|_| anyhow!("call log poisoned"))?
            .push(LlmCall {
                instruction: instruction.to_string(),
                utterance: utterance.to_string(),
            });

        if self.routed && instruction == QUESTION_INSTRUCTION {
            return Ok(format!("What is your preference for {utterance}?"));
        }
        if self.routed && instruction == RECOMMENDATION_INSTRUCTION {
            return Ok(format!("Based on your preferences, I would recommend {utterance}."));
        }

        self.replies
            .lock()
            .map_err(|_| anyhow!("reply queue poisoned"))?
            .pop_front()
            .ok_or_else(|| anyhow!("no scripted reply left"))
    }
}

#[derive(Default)]
pub(crate) struct ScriptedIo {
    answers: VecDeque<String>,
    pub prompts: Vec<String>,
    pub said: Vec<String>,
}

impl ScriptedIo {
    pub fn new<const N: usize>(answers: [&str; N]) -> Self {
        Self {
            answers: answers.iter().map(|answer| answer.to_string()).collect(),
            ..Self::default()
        }
    }
}

impl DialogueIo for ScriptedIo {
    fn ask(&mut self, prompt: &str) -> Result<String> {
        self.prompts.push(prompt.to_string());
        match self.answers.pop_front() {
            Some(answer) => Ok(answer),
            None => bail!("input closed before an answer was given"),
        }
    }

    fn say(&mut self, text: &str) -> Result<()> {
        self.said.push(text.to_string());
        Ok(())
    }
}

pub(crate) enum EngineReply {
    Model(Option<&'static str>),
    Exit(&'static str),
}

pub(crate) struct FakeEngine {
    reply: EngineReply,
    goals: Mutex<Vec<String>>,
}

impl FakeEngine {
    pub fn new(reply: EngineReply) -> Self {
        Self { reply, goals: Mutex::new(Vec::new()) }
    }

    pub fn goals(&self) -> Vec<String> {
        self.goals.lock().map(|goals| goals.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ReasoningEngine for FakeEngine {
    async fn first_model(&self, query: &SolverQuery) -> Result<Option<GameId>, SolverError> {
        if let Ok(mut goals) = self.goals.lock() {
            goals.push(query.to_string());
        }
        match &self.reply {
            EngineReply::Model(identifier) => Ok(identifier.map(|id| GameId(id.to_string()))),
            EngineReply::Exit(stderr) => Err(SolverError::Exit {
                status: "exit status: 1".to_string(),
                stderr: stderr.to_string(),
            }),
        }
    }
}
