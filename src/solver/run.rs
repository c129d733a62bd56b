// src/solver/run.rs
//
// The timestep loop. Every rank walks the same sequence per iteration:
// accelerate, halo exchange, propagate, rebound, collide, average. The
// per-step reduction and the final gather both funnel into rank 0, which
// keeps the averages record and reassembles the global field.

use std::thread;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use crossbeam::channel::{unbounded, Receiver, Sender};
use indicatif::{ProgressBar, ProgressStyle};

use crate::solver::halo::{self, HaloLinks};
use crate::solver::init::Slab;
use crate::solver::kernel;
use crate::solver::lattice::Speed;
use crate::solver::lbm::{Lbm, SimOutput};
use crate::solver::params::Params;

/// partial velocity sum and fluid-cell count for one rank, one step
type Partial = (f32, usize);

const ROOT: usize = 0;

impl Lbm {
    /// Run the simulation for `max_iters` steps across `self.ranks` worker
    /// threads and return rank 0's results.
    pub fn run(&self) -> Result<SimOutput> {
        let params = self.params;
        let ranks = self.ranks;

        let mut halos: Vec<Option<HaloLinks>> =
            halo::ring(ranks).into_iter().map(Some).collect();

        // one reduction and one gather channel per non-root rank
        let mut reduce_txs: Vec<Option<Sender<Partial>>> = vec![None];
        let mut reduce_rxs: Vec<Receiver<Partial>> = Vec::new();
        let mut gather_txs: Vec<Option<Sender<Vec<Speed>>>> = vec![None];
        let mut gather_rxs: Vec<Receiver<Vec<Speed>>> = Vec::new();
        for _ in 1..ranks {
            let (tx, rx) = unbounded();
            reduce_txs.push(Some(tx));
            reduce_rxs.push(rx);
            let (tx, rx) = unbounded();
            gather_txs.push(Some(tx));
            gather_rxs.push(rx);
        }
        let mut reduce_rxs = Some(reduce_rxs);
        let mut gather_rxs = Some(gather_rxs);

        let start = Instant::now();

        let output = thread::scope(|scope| -> Result<RootOutput> {
            let mut handles = Vec::with_capacity(ranks);

            for rank in 0..ranks {
                let worker = RankWorker {
                    rank,
                    params,
                    slab: Slab::new(&params, rank, ranks, &self.obstacles),
                    halo: halos[rank].take().ok_or_else(|| anyhow!("halo links"))?,
                    reduce_tx: reduce_txs[rank].take(),
                    reduce_rxs: if rank == ROOT { reduce_rxs.take() } else { None },
                    gather_tx: gather_txs[rank].take(),
                    gather_rxs: if rank == ROOT { gather_rxs.take() } else { None },
                    progress: rank == ROOT && self.show_progress,
                };
                handles.push(scope.spawn(move || worker.run()));
            }

            let mut output = None;
            for handle in handles {
                let result = handle
                    .join()
                    .map_err(|_| anyhow!("a rank panicked; aborting the job"))?;
                if let Some(out) = result? {
                    output = Some(out);
                }
            }
            output.ok_or_else(|| anyhow!("root rank produced no output"))
        })?;

        Ok(SimOutput {
            av_vels: output.av_vels,
            cells: output.cells,
            elapsed: start.elapsed(),
        })
    }
}

struct RootOutput {
    av_vels: Vec<f32>,
    cells: Vec<Speed>,
}

struct RankWorker {
    rank: usize,
    params: Params,
    slab: Slab,
    halo: HaloLinks,
    /// non-root: partial averages to rank 0
    reduce_tx: Option<Sender<Partial>>,
    /// rank 0: partials from ranks 1..R in rank order
    reduce_rxs: Option<Vec<Receiver<Partial>>>,
    /// non-root: final slab to rank 0
    gather_tx: Option<Sender<Vec<Speed>>>,
    /// rank 0: slabs from ranks 1..R in rank order
    gather_rxs: Option<Vec<Receiver<Vec<Speed>>>>,
    progress: bool,
}

impl RankWorker {
    fn run(mut self) -> Result<Option<RootOutput>> {
        let bar = self.progress_bar();
        let mut av_vels = Vec::with_capacity(if self.rank == ROOT {
            self.params.max_iters
        } else {
            0
        });

        for _tt in 0..self.params.max_iters {
            kernel::accelerate(&self.params, &mut self.slab);
            halo::exchange(&mut self.slab, &self.halo)?;
            kernel::propagate(&mut self.slab);
            kernel::rebound(&mut self.slab);
            kernel::collide(&self.params, &mut self.slab);

            let local = kernel::local_velocity_sum(&self.slab);
            match (&self.reduce_tx, &self.reduce_rxs) {
                (Some(tx), _) => tx
                    .send(local)
                    .map_err(|_| anyhow!("average reduction: root rank is gone"))?,
                (None, Some(rxs)) => {
                    let (mut tot_u, mut tot_cells) = local;
                    for rx in rxs {
                        let (u, cells) = rx
                            .recv()
                            .context("average reduction: a rank stopped responding")?;
                        tot_u += u;
                        tot_cells += cells;
                    }
                    av_vels.push(tot_u / tot_cells as f32);
                }
                (None, None) => unreachable!("rank without a reduction role"),
            }

            if let Some(bar) = &bar {
                bar.inc(1);
            }
        }
        if let Some(bar) = bar {
            bar.finish_with_message("");
        }

        // gather the final field at the root, slabs in rank order
        match (self.gather_tx, self.gather_rxs) {
            (Some(tx), _) => {
                tx.send(self.slab.interior().to_vec())
                    .map_err(|_| anyhow!("final gather: root rank is gone"))?;
                Ok(None)
            }
            (None, Some(rxs)) => {
                let mut cells = self.slab.interior().to_vec();
                for rx in rxs {
                    let slab = rx
                        .recv()
                        .context("final gather: a rank stopped responding")?;
                    cells.extend_from_slice(&slab);
                }
                Ok(Some(RootOutput { av_vels, cells }))
            }
            (None, None) => unreachable!("rank without a gather role"),
        }
    }

    fn progress_bar(&self) -> Option<ProgressBar> {
        if !self.progress {
            return None;
        }
        let bar = ProgressBar::new(self.params.max_iters as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:55.cyan/blue}] {pos}/{len} ({eta})")
                .unwrap()
                .progress_chars("=> "),
        );
        Some(bar)
    }
}
