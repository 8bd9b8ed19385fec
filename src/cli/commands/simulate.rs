use anyhow::Result;

use crate::cli::commands::build_controller;
use crate::config::TransmuteConfig;
use crate::presentation::{Notice, PanelView};
use crate::transmutation::{Complexity, TransmutationDraft};

/// One-shot simulate, optionally followed by the commit
pub struct SimulateCommand {
    pub inputs: Vec<String>,
    pub output: String,
    pub complexity: Complexity,
    pub commit: bool,
    pub actor: Option<u64>,
}

impl SimulateCommand {
    pub fn new(inputs: Vec<String>, output: String, complexity: Complexity) -> Self {
        Self {
            inputs,
            output,
            complexity,
            commit: false,
            actor: None,
        }
    }

    pub fn with_commit(mut self, actor: Option<u64>) -> Self {
        self.commit = true;
        self.actor = actor;
        self
    }

    pub async fn execute(&self, config: &TransmuteConfig) -> Result<()> {
        let draft = TransmutationDraft::with_materials(self.inputs.iter().cloned(), self.output.clone(), self.complexity);
        let controller = build_controller(config, draft, self.actor)?;

        println!("🔍 Simulating transmutation...");
        let simulated = controller.simulate().await;
        let notice = Notice::from_simulation(&simulated);
        println!("{}", notice);
        simulated?;

        println!();
        println!("{}", PanelView::from_snapshot(&controller.snapshot()));

        if !self.commit {
            println!();
            println!("💡 Run 'amestris transmute' with the same materials to perform it");
            return Ok(());
        }

        println!();
        println!("⚡ Performing transmutation as alchemist #{}...", controller.actor_id());
        let committed = controller.commit().await;
        println!("{}", Notice::from_commit(&committed));
        committed?;
        Ok(())
    }
}
