// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The parallel engine.  One fixed pool of worker threads is spawned
//! when the engine is built and lives until the engine is dropped;
//! requests are carved into row bands ("tracks") and pushed through an
//! MPMC channel that the workers drain.  Because the bands are
//! disjoint, every pixel of the result is written by exactly one
//! worker and the buffer needs no locking at all.

use crossbeam::channel::{bounded, unbounded, Receiver, Sender};
use errors::FractalError;
use sampler::NewtonSampler;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use viewport::Viewport;

/// What the engine hands back for a request that ran to completion.
/// The pixel data itself lands in the buffer the caller supplied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Completion {
    /// The number of color classes in the buffer, counting the
    /// reserved "no convergence" class 0.
    pub num_colors: i16,
    /// The request this completion answers, echoed back so a caller
    /// juggling superseded requests can tell frames apart.
    pub request_id: u64,
}

/// An inclusive band of image rows, the unit of work one job covers.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Track {
    y_min: usize,
    y_max: usize,
}

impl Track {
    fn rows(&self) -> usize {
        self.y_max - self.y_min + 1
    }
}

/// Cut `height` rows into `tracks` contiguous bands of height/tracks
/// rows each, the last band absorbing the remainder.  Every row lands
/// in exactly one band and the bands come back in top-to-bottom order.
fn partition_rows(height: usize, tracks: usize) -> Vec<Track> {
    let tracks = tracks.min(height);
    let rows_per_track = height / tracks;
    (0..tracks)
        .map(|at| Track {
            y_min: at * rows_per_track,
            y_max: if at == tracks - 1 {
                height - 1
            } else {
                (at + 1) * rows_per_track - 1
            },
        })
        .collect()
}

/// One band's worth of work.  The job owns the slice of the result it
/// is allowed to touch; nothing is shared with the other jobs except
/// the read-only sampler and the cancellation flag.
struct TrackJob {
    viewport: Viewport,
    band: Track,
    sampler: Arc<NewtonSampler>,
    rows: Vec<i16>,
    cancel: Arc<AtomicBool>,
    done: Sender<(usize, Vec<i16>)>,
}

impl TrackJob {
    fn run(mut self) {
        let width = self.viewport.width;
        let mut offset = 0;
        for y in self.band.y_min..=self.band.y_max {
            // Cancellation is cooperative and row-grained: rows
            // already written stay, rows not yet reached stay 0.
            if self.cancel.load(Ordering::Relaxed) {
                break;
            }
            for x in 0..width {
                self.rows[offset] = self.sampler.classify(self.viewport.point_at(x, y));
                offset += 1;
            }
        }
        // A receiver that has hung up means the request was abandoned
        // wholesale; there is nobody left to care about this band.
        let _ = self.done.send((self.band.y_min, self.rows));
    }
}

/// What travels down the job queue: either a band to compute or the
/// poison pill that tells a worker to go home.
enum Job {
    Track(TrackJob),
    Shutdown,
}

fn worker_loop(id: usize, jobs: Receiver<Job>) {
    debug!("worker {} waiting for work", id);
    loop {
        match jobs.recv() {
            Ok(Job::Track(job)) => job.run(),
            Ok(Job::Shutdown) | Err(_) => break,
        }
    }
    debug!("worker {} stopped", id);
}

/// A fixed pool of worker threads fed from one job queue.  Workers are
/// spawned once, here, and reused for every request until the engine
/// itself is dropped, at which point each is handed a shutdown job and
/// joined.
pub struct ParallelFractalEngine {
    jobs: Sender<Job>,
    workers: Vec<JoinHandle<()>>,
    tracks: usize,
}

impl ParallelFractalEngine {
    /// Build an engine with `workers` threads and `tracks` bands per
    /// request.  Both must be at least 1; the track count is clamped
    /// to the image height later, per request, since a band must hold
    /// at least one row.
    pub fn new(workers: usize, tracks: usize) -> Result<ParallelFractalEngine, FractalError> {
        if workers < 1 {
            return Err(FractalError::BadConfiguration {
                name: "workers",
                value: workers,
            });
        }
        if tracks < 1 {
            return Err(FractalError::BadConfiguration {
                name: "tracks",
                value: tracks,
            });
        }
        let (jobs, intake) = unbounded();
        let workers = (0..workers)
            .map(|id| {
                let intake = intake.clone();
                thread::spawn(move || worker_loop(id, intake))
            })
            .collect();
        Ok(ParallelFractalEngine {
            jobs,
            workers,
            tracks,
        })
    }

    /// The number of worker threads in the pool.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// The number of tracks a request is carved into, before the
    /// per-request clamp to the image height.
    pub fn track_count(&self) -> usize {
        self.tracks
    }

    /// Render one frame into `data`, which must hold exactly
    /// width * height cells.  Synchronous: returns once every band has
    /// come back.  The return value is `Some` with the frame metadata
    /// when the request ran to completion, and `None` when the cancel
    /// flag was raised, in which case the buffer holds a partial frame
    /// that is not fit for display.
    pub fn compute(
        &self,
        sampler: &Arc<NewtonSampler>,
        viewport: Viewport,
        data: &mut [i16],
        request_id: u64,
        cancel: &Arc<AtomicBool>,
    ) -> Option<Completion> {
        assert_eq!(
            data.len(),
            viewport.len(),
            "result buffer does not match the viewport"
        );
        assert!(!viewport.is_empty(), "cannot render an empty viewport");
        let bands = partition_rows(viewport.height, self.tracks);
        info!(
            "request {}: {}x{} px in {} tracks across {} workers",
            request_id,
            viewport.width,
            viewport.height,
            bands.len(),
            self.workers.len()
        );
        let (done, finished) = bounded(bands.len());
        for &band in &bands {
            let job = TrackJob {
                viewport,
                band,
                sampler: Arc::clone(sampler),
                rows: vec![0; band.rows() * viewport.width],
                cancel: Arc::clone(cancel),
                done: done.clone(),
            };
            self.jobs
                .send(Job::Track(job))
                .expect("the worker pool is gone");
        }
        drop(done);
        for _ in 0..bands.len() {
            let (y_min, rows) = finished.recv().expect("the worker pool is gone");
            let offset = y_min * viewport.width;
            data[offset..offset + rows.len()].copy_from_slice(&rows);
        }
        if cancel.load(Ordering::Relaxed) {
            debug!("request {} was cancelled", request_id);
            return None;
        }
        Some(Completion {
            num_colors: sampler.num_colors(),
            request_id,
        })
    }
}

impl Drop for ParallelFractalEngine {
    fn drop(&mut self) {
        for _ in 0..self.workers.len() {
            let _ = self.jobs.send(Job::Shutdown);
        }
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use complex::Complex;
    use polynomial::ComplexRootedPolynomial;

    fn quadratic() -> Arc<NewtonSampler> {
        Arc::new(NewtonSampler::new(ComplexRootedPolynomial::new(
            Complex::ONE,
            vec![Complex::ONE, Complex::ONE_NEG],
        )))
    }

    fn render(engine: &ParallelFractalEngine, viewport: Viewport) -> Vec<i16> {
        let sampler = quadratic();
        let cancel = Arc::new(AtomicBool::new(false));
        let mut data = vec![0; viewport.len()];
        let completion = engine
            .compute(&sampler, viewport, &mut data, 1, &cancel)
            .expect("request was not cancelled");
        assert_eq!(completion.num_colors, 3);
        assert_eq!(completion.request_id, 1);
        data
    }

    #[test]
    fn every_row_lands_in_exactly_one_track() {
        for height in 1..=40 {
            for tracks in 1..=height {
                let bands = partition_rows(height, tracks);
                assert_eq!(bands.len(), tracks);
                let mut next = 0;
                for band in &bands {
                    assert_eq!(band.y_min, next, "gap or overlap at {}", next);
                    assert!(band.y_max >= band.y_min);
                    next = band.y_max + 1;
                }
                assert_eq!(next, height, "rows left uncovered");
            }
        }
    }

    #[test]
    fn track_counts_beyond_the_height_are_clamped() {
        let bands = partition_rows(10, 64);
        assert_eq!(bands.len(), 10);
        assert_eq!(bands[0], Track { y_min: 0, y_max: 0 });
        assert_eq!(bands[9], Track { y_min: 9, y_max: 9 });
    }

    #[test]
    fn the_last_track_absorbs_the_remainder() {
        let bands = partition_rows(10, 4);
        assert_eq!(bands.len(), 4);
        assert_eq!(bands[3], Track { y_min: 6, y_max: 9 });
    }

    #[test]
    fn zero_workers_or_tracks_are_rejected() {
        match ParallelFractalEngine::new(0, 4) {
            Err(FractalError::BadConfiguration { name, value }) => {
                assert_eq!(name, "workers");
                assert_eq!(value, 0);
            }
            _ => panic!("expected a configuration error"),
        }
        assert!(ParallelFractalEngine::new(4, 0).is_err());
    }

    #[test]
    fn the_worker_count_does_not_change_the_image() {
        let viewport = Viewport::new(-2.0, 2.0, -2.0, 2.0, 48, 48);
        let lone = ParallelFractalEngine::new(1, 7).unwrap();
        let pool = ParallelFractalEngine::new(4, 7).unwrap();
        assert_eq!(render(&lone, viewport), render(&pool, viewport));
    }

    #[test]
    fn halves_of_the_plane_converge_to_their_root() {
        let engine = ParallelFractalEngine::new(4, 16).unwrap();
        let viewport = Viewport::new(-2.0, 2.0, -2.0, 2.0, 100, 100);
        let data = render(&engine, viewport);
        for (y, x) in iproduct!(0..100usize, 0..100usize) {
            let point = viewport.point_at(x, y);
            // No pixel of this grid lands exactly on the imaginary
            // axis, so every pixel has a definite half.
            let expected = if point.re > 0.0 { 1 } else { 2 };
            assert_eq!(
                data[y * 100 + x],
                expected,
                "pixel ({}, {}) at {}",
                x,
                y,
                point
            );
        }
    }

    #[test]
    fn a_cancelled_request_yields_no_completion() {
        let engine = ParallelFractalEngine::new(2, 4).unwrap();
        let viewport = Viewport::new(-2.0, 2.0, -2.0, 2.0, 32, 32);
        let sampler = quadratic();
        let cancel = Arc::new(AtomicBool::new(true));
        let mut data = vec![0; viewport.len()];
        let completion = engine.compute(&sampler, viewport, &mut data, 9, &cancel);
        assert_eq!(completion, None);
        // Nothing was reached, so nothing was written.
        assert!(data.iter().all(|&pixel| pixel == 0));
    }

    #[test]
    fn cancellation_leaves_every_row_whole_or_untouched() {
        let viewport = Viewport::new(-2.0, 2.0, -2.0, 2.0, 64, 64);
        let reference = {
            let engine = ParallelFractalEngine::new(2, 8).unwrap();
            render(&engine, viewport)
        };

        let engine = ParallelFractalEngine::new(2, 8).unwrap();
        let sampler = quadratic();
        let cancel = Arc::new(AtomicBool::new(false));
        let mut data = vec![0; viewport.len()];
        let flipper = {
            let cancel = Arc::clone(&cancel);
            thread::spawn(move || cancel.store(true, Ordering::Relaxed))
        };
        let _ = engine.compute(&sampler, viewport, &mut data, 2, &cancel);
        flipper.join().unwrap();

        // Cancellation is checked once per row, so each row is either
        // fully computed, and then it must match the uncancelled
        // render, or never started.
        for y in 0..64 {
            let row = &data[y * 64..(y + 1) * 64];
            assert!(
                row == &reference[y * 64..(y + 1) * 64] || row.iter().all(|&pixel| pixel == 0),
                "row {} was torn",
                y
            );
        }
    }

    #[test]
    fn the_pool_is_reusable_across_requests() {
        let engine = ParallelFractalEngine::new(3, 5).unwrap();
        let viewport = Viewport::new(-2.0, 2.0, -2.0, 2.0, 24, 24);
        let first = render(&engine, viewport);
        let second = render(&engine, viewport);
        assert_eq!(first, second);
    }
}
