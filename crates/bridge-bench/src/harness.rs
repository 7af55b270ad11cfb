use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use bridge_bot::{Evaluator, Search};
use bridge_core::game::phase::GamePhase;
use bridge_core::game::session::PlaySession;
use bridge_core::model::deck::Deck;
use bridge_core::model::hand::Hand;
use bridge_core::score::calculate_score;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::info;

use crate::config::{BenchConfig, ResolvedOutputs};

/// Plays every configured board to completion with the search driving all
/// four seats, writing one JSONL row per decision and per board result.
pub struct Harness {
    config: BenchConfig,
    outputs: ResolvedOutputs,
}

#[derive(Debug)]
pub struct HarnessSummary {
    pub boards_played: usize,
    pub contracts_made: usize,
    pub rows_written: usize,
    pub seed: u64,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
}

#[derive(Serialize)]
struct DecisionRow {
    kind: &'static str,
    board: usize,
    seat: String,
    card: String,
    nodes: u64,
    leaf_nodes: u64,
    pruned: u64,
    elapsed_us: u64,
    best_score: f32,
    depth: u8,
}

#[derive(Serialize)]
struct BoardRow {
    kind: &'static str,
    board: usize,
    contract: String,
    declarer_tricks: u8,
    made: bool,
    overtricks: u8,
    undertricks: u8,
    honors_bonus: i32,
    total: i32,
}

impl Harness {
    pub fn new(config: BenchConfig, outputs: ResolvedOutputs) -> Self {
        Self { config, outputs }
    }

    pub fn run(&self) -> Result<HarnessSummary> {
        let contract = self
            .config
            .contract
            .to_contract()
            .context("resolving the configured contract")?;
        let vulnerability = self.config.contract.vulnerability;
        let search = Search::new(
            self.config.search.depth,
            Evaluator::heuristic(self.config.search.weights.eval_weights()),
        );

        let seed = self.config.deals.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);

        if let Some(parent) = self.outputs.jsonl.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output directory {}", parent.display()))?;
        }
        let jsonl_file = File::create(&self.outputs.jsonl)
            .with_context(|| format!("creating {}", self.outputs.jsonl.display()))?;
        let mut jsonl = BufWriter::new(jsonl_file);

        let mut rows_written = 0usize;
        let mut board_rows = Vec::with_capacity(self.config.deals.boards);

        for board in 1..=self.config.deals.boards {
            let deck = Deck::shuffled(&mut rng);
            let mut hands: [Hand; 4] = std::array::from_fn(|_| Hand::new());
            for (index, card) in deck.cards().iter().enumerate() {
                hands[index % 4].add(*card);
            }
            let dealt = hands.clone();

            let mut session = PlaySession::new(contract, hands, vulnerability)
                .context("building the play session")?;

            while !session.is_play_complete() {
                let seat = session.next_to_play();
                let (card, stats) = search.choose_card(&session, seat);
                session
                    .play_card(seat, card)
                    .context("applying the searched card")?;

                let row = DecisionRow {
                    kind: "decision",
                    board,
                    seat: seat.to_string(),
                    card: card.to_string(),
                    nodes: stats.nodes,
                    leaf_nodes: stats.leaf_nodes,
                    pruned: stats.pruned,
                    elapsed_us: stats.elapsed.as_micros() as u64,
                    best_score: stats.best_score,
                    depth: stats.depth,
                };
                serde_json::to_writer(&mut jsonl, &row)?;
                jsonl.write_all(b"\n")?;
                rows_written += 1;
            }

            session
                .transition_to(GamePhase::Scoring)
                .context("entering the scoring phase")?;
            let result = calculate_score(
                &contract,
                session.declarer_tricks(),
                vulnerability,
                Some(&dealt),
            );
            session
                .transition_to(GamePhase::RoundComplete)
                .context("completing the round")?;

            info!(
                target: "bridge_bench::board",
                board,
                declarer_tricks = session.declarer_tricks(),
                made = result.made,
                total = result.total,
                "board finished"
            );

            let row = BoardRow {
                kind: "board",
                board,
                contract: contract.to_string(),
                declarer_tricks: session.declarer_tricks(),
                made: result.made,
                overtricks: result.overtricks,
                undertricks: result.undertricks,
                honors_bonus: result.breakdown.honors_bonus,
                total: result.total,
            };
            serde_json::to_writer(&mut jsonl, &row)?;
            jsonl.write_all(b"\n")?;
            rows_written += 1;
            board_rows.push(row);
        }

        jsonl.flush()?;
        self.write_summary(&board_rows, seed)?;

        Ok(HarnessSummary {
            boards_played: board_rows.len(),
            contracts_made: board_rows.iter().filter(|row| row.made).count(),
            rows_written,
            seed,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
        })
    }

    fn write_summary(&self, boards: &[BoardRow], seed: u64) -> Result<()> {
        if let Some(parent) = self.outputs.summary_md.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output directory {}", parent.display()))?;
        }
        let file = File::create(&self.outputs.summary_md)
            .with_context(|| format!("creating {}", self.outputs.summary_md.display()))?;
        let mut out = BufWriter::new(file);

        writeln!(out, "# bridge-bench: {}", self.config.run_id)?;
        writeln!(out)?;
        writeln!(
            out,
            "{} boards, search depth {}, seed {seed}",
            boards.len(),
            self.config.search.depth
        )?;
        writeln!(out)?;
        writeln!(out, "| board | contract | tricks | result | score |")?;
        writeln!(out, "|------:|----------|-------:|--------|------:|")?;
        for row in boards {
            let result = if row.made {
                format!("made +{}", row.overtricks)
            } else {
                format!("down {}", row.undertricks)
            };
            writeln!(
                out,
                "| {} | {} | {} | {} | {} |",
                row.board, row.contract, row.declarer_tricks, result, row.total
            )?;
        }
        writeln!(out)?;
        let made = boards.iter().filter(|row| row.made).count();
        writeln!(out, "{made} of {} contracts made.", boards.len())?;
        out.flush()?;
        Ok(())
    }
}
