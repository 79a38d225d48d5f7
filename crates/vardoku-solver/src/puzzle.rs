//! Solving straight from puzzle text.
//!
//! These entry points build the [`ClueSource`], parse the grid and solve it in
//! one call. Configuration problems come back as [`PuzzleError`], while
//! contradictions in the puzzle itself are part of the [`SolveResult`].

use std::{future::Future, sync::Arc};

use futures_channel::oneshot;
use vardoku_core::{Bounds, ValueDomain};

use crate::{
    Cancellation, Cancelled, ClueSource, ClueSourceError, ClueSpecs, Grid, GridParseError,
    SolveResult, Solver, SolverConfig,
};

/// Everything needed to solve one puzzle.
#[derive(Debug, Clone)]
pub struct PuzzleRequest {
    /// The rules.
    pub specs: ClueSpecs,
    /// Grid dimensions.
    pub bounds: Bounds,
    /// Legal values and their symbols.
    pub values: ValueDomain,
    /// Grid text as read by [`Grid::parse`].
    pub text: String,
    /// Solver settings.
    pub config: SolverConfig,
    /// Checked between passes, branches and guesses.
    pub cancel: Cancellation,
}

/// Why a puzzle request could not be solved.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum PuzzleError {
    /// The rules are invalid.
    #[display("invalid clues: {_0}")]
    ClueSource(ClueSourceError),
    /// The grid text is malformed.
    #[display("invalid grid: {_0}")]
    Parse(GridParseError),
    /// The request was cancelled.
    #[display("{_0}")]
    Cancelled(Cancelled),
    /// The background worker stopped before answering.
    #[display("solver worker disconnected")]
    #[from(skip)]
    WorkerDisconnected,
}

/// Builds the clue set, parses the grid and solves it on the calling thread.
///
/// # Errors
///
/// Returns [`PuzzleError`] for invalid clues, malformed text or cancellation.
pub fn solve_puzzle(request: PuzzleRequest) -> Result<SolveResult, PuzzleError> {
    let PuzzleRequest {
        specs,
        bounds,
        values,
        text,
        config,
        cancel,
    } = request;
    let source = Arc::new(ClueSource::build(specs, bounds, values)?);
    let grid = Grid::parse(source, &text)?;
    Ok(Solver::new(config).solve(&grid, &cancel)?)
}

/// Runs [`solve_puzzle`] on a background thread.
///
/// The returned future resolves once the worker finishes. Dropping it does not
/// stop the worker; use the request's [`Cancellation`] for that.
pub fn solve_puzzle_async(
    request: PuzzleRequest,
) -> impl Future<Output = Result<SolveResult, PuzzleError>> {
    let (responder, receiver) = oneshot::channel();
    std::thread::spawn(move || {
        let _ = responder.send(solve_puzzle(request));
    });
    async move {
        match receiver.await {
            Ok(result) => result,
            Err(oneshot::Canceled) => Err(PuzzleError::WorkerDisconnected),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        pin::pin,
        sync::Arc,
        task::{Context, Poll, Wake, Waker},
        thread::{self, Thread},
    };

    use vardoku_core::Position;

    use super::*;

    struct ThreadWaker(Thread);

    impl Wake for ThreadWaker {
        fn wake(self: Arc<Self>) {
            self.0.unpark();
        }
    }

    fn block_on<F: Future>(future: F) -> F::Output {
        let mut future = pin!(future);
        let waker = Waker::from(Arc::new(ThreadWaker(thread::current())));
        let mut cx = Context::from_waker(&waker);
        loop {
            match future.as_mut().poll(&mut cx) {
                Poll::Ready(output) => return output,
                Poll::Pending => thread::park(),
            }
        }
    }

    fn request(text: &str) -> PuzzleRequest {
        let bounds = Bounds::new(4, 4);
        let mut specs = ClueSpecs::new();
        specs.classic(bounds, 2, 2);
        PuzzleRequest {
            specs,
            bounds,
            values: ValueDomain::digits(1..=4).unwrap(),
            text: text.to_owned(),
            config: SolverConfig::default(),
            cancel: Cancellation::new(),
        }
    }

    #[test]
    fn test_async_solves() {
        let result = block_on(solve_puzzle_async(request("1...\n..2.\n.3..\n...4"))).unwrap();
        assert!(result.success);
        assert_eq!(result.grid.to_text(), "1243\n3421\n4312\n2134");
    }

    #[test]
    fn test_configuration_errors_are_distinct() {
        let mut bad = request("1...\n..2.\n.3..\n...4");
        bad.specs
            .uniqueness("outside", [Position::new(0, 0), Position::new(4, 0)]);
        assert!(matches!(
            block_on(solve_puzzle_async(bad)),
            Err(PuzzleError::ClueSource(ClueSourceError::OutOfBounds { .. }))
        ));

        assert!(matches!(
            solve_puzzle(request("1...\n..2.")),
            Err(PuzzleError::Parse(GridParseError::RowCount { .. }))
        ));
    }

    #[test]
    fn test_contradiction_is_a_result() {
        let result = solve_puzzle(request("11..\n....\n....\n....")).unwrap();
        assert!(!result.success);
        assert!(result.is_contradiction());
    }

    #[test]
    fn test_cancelled_request() {
        let request = request("....\n....\n....\n....");
        request.cancel.cancel();
        assert_eq!(
            solve_puzzle(request).unwrap_err(),
            PuzzleError::Cancelled(Cancelled)
        );
    }
}
