// src/solver/halo.rs
//
// Ranks form a one-dimensional ring over the row decomposition: rank r
// owns global rows [r * local_ny, (r + 1) * local_ny), so the rank above
// is (r + 1) % R and the rank below is (r + R - 1) % R, with rank 0 and
// rank R - 1 adjacent to close the periodic wrap.

use anyhow::{anyhow, Result};
use crossbeam::channel::{unbounded, Receiver, Sender};

use crate::solver::init::Slab;
use crate::solver::lattice::D2Q9;

/// One packed halo row: all nine populations for each of the `nx` cells.
pub type RowBuf = Vec<f32>;

/// One rank's endpoints into the ring. Sends are non-blocking and each
/// receive matches exactly one neighbor send per step, so the exchange
/// cannot deadlock; channel FIFO order keeps the steps aligned.
pub struct HaloLinks {
    /// carries the top interior row to the rank above (its south ghost)
    send_up: Sender<RowBuf>,
    /// carries the bottom interior row to the rank below (its north ghost)
    send_dn: Sender<RowBuf>,
    /// fills the north ghost from the rank above's bottom interior row
    recv_north: Receiver<RowBuf>,
    /// fills the south ghost from the rank below's top interior row
    recv_south: Receiver<RowBuf>,
}

/// Build the channel fabric for `ranks` ranks. With a single rank both
/// neighbors are the rank itself and the exchange degenerates to the
/// periodic self-wrap.
pub fn ring(ranks: usize) -> Vec<HaloLinks> {
    // channels addressed by the ghost row they fill
    let (north_tx, north_rx): (Vec<_>, Vec<_>) = (0..ranks).map(|_| unbounded()).unzip();
    let (south_tx, south_rx): (Vec<_>, Vec<_>) = (0..ranks).map(|_| unbounded()).unzip();

    north_rx
        .into_iter()
        .zip(south_rx)
        .enumerate()
        .map(|(r, (recv_north, recv_south))| {
            let up = (r + 1) % ranks;
            let dn = (r + ranks - 1) % ranks;
            HaloLinks {
                send_up: south_tx[up].clone(),
                send_dn: north_tx[dn].clone(),
                recv_north,
                recv_south,
            }
        })
        .collect()
}

/// Refresh both ghost rows of the primary grid from the neighbors'
/// interior edge rows. Must run after any write to interior edge rows and
/// before the next propagate.
pub fn exchange(slab: &mut Slab, links: &HaloLinks) -> Result<()> {
    links
        .send_up
        .send(pack_row(slab, slab.local_ny))
        .map_err(|_| anyhow!("halo exchange: neighbor rank is gone"))?;
    links
        .send_dn
        .send(pack_row(slab, 1))
        .map_err(|_| anyhow!("halo exchange: neighbor rank is gone"))?;

    let south = links
        .recv_south
        .recv()
        .map_err(|_| anyhow!("halo exchange: neighbor rank is gone"))?;
    unpack_row(slab, 0, &south);

    let north = links
        .recv_north
        .recv()
        .map_err(|_| anyhow!("halo exchange: neighbor rank is gone"))?;
    unpack_row(slab, slab.local_ny + 1, &north);

    Ok(())
}

fn pack_row(slab: &Slab, jj: usize) -> RowBuf {
    let mut buf = Vec::with_capacity(slab.nx * D2Q9::Q);
    for ii in 0..slab.nx {
        buf.extend_from_slice(&slab.cells[slab.idx(ii, jj)].speeds);
    }
    buf
}

fn unpack_row(slab: &mut Slab, jj: usize, buf: &RowBuf) {
    debug_assert_eq!(buf.len(), slab.nx * D2Q9::Q);
    for (ii, chunk) in buf.chunks_exact(D2Q9::Q).enumerate() {
        let n = slab.idx(ii, jj);
        slab.cells[n].speeds.copy_from_slice(chunk);
    }
}
