use crate::{Error, Result};

use std::collections::VecDeque;

/// A stream of uniform samples in `[0, 1)`.
///
/// The model never generates randomness itself. Every trial pulls its draws from an implementor of this trait, four
/// per customer, in the fixed order interarrival, service 1, service 2, balk. Swapping one source for another that
/// yields the same sequence of values reproduces the same customer records exactly.
///
/// Two implementations are provided. [`RngDraws`] adapts any [`rand::Rng`], and [`ReplayDraws`] plays back a recorded
/// sequence, which is how the trial tests pin down concrete scenarios.
///
/// Returning a [`Result`] lets finite sources report exhaustion as an [`Error::InvalidState`] rather than panicking.
/// Range checking of the values themselves happens in [`CustomerDraws::new()`], so an implementor is free to hand back
/// whatever it produced.
pub trait DrawSource {
    /// Produce the next uniform sample.
    ///
    /// # Errors
    ///
    /// Implementors used up in a finite manner should return [`Error::InvalidState`] once no values remain.
    fn next_draw(&mut self) -> Result<f64>;
}

impl<S> DrawSource for &mut S
where
    S: DrawSource + ?Sized,
{
    fn next_draw(&mut self) -> Result<f64> {
        (**self).next_draw()
    }
}

/// Adapter that draws uniforms from any [`rand::Rng`].
///
/// ```
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
/// use tandem_queue::{DrawSource, RngDraws};
///
/// let mut draws = RngDraws::new(StdRng::seed_from_u64(7));
/// let u = draws.next_draw().unwrap();
/// assert!((0.0..1.0).contains(&u));
/// ```
#[derive(Debug, Clone)]
pub struct RngDraws<R> {
    rng: R,
}

impl<R> RngDraws<R>
where
    R: rand::Rng,
{
    /// Wrap the provided generator.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Recover the wrapped generator.
    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl<R> DrawSource for RngDraws<R>
where
    R: rand::Rng,
{
    fn next_draw(&mut self) -> Result<f64> {
        Ok(self.rng.random::<f64>())
    }
}

/// Plays back a recorded sequence of draws, front to back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayDraws {
    remaining: VecDeque<f64>,
    consumed: usize,
}

impl ReplayDraws {
    /// Queue up the provided draws for playback.
    pub fn new<I>(draws: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        Self {
            remaining: draws.into_iter().collect(),
            consumed: 0,
        }
    }

    /// Number of draws not yet handed out.
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    /// Number of draws handed out so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

impl DrawSource for ReplayDraws {
    fn next_draw(&mut self) -> Result<f64> {
        match self.remaining.pop_front() {
            Some(draw) => {
                self.consumed += 1;
                Ok(draw)
            },
            None => Err(Error::invalid_state(format!(
                "replay exhausted after {} draws",
                self.consumed
            ))),
        }
    }
}

/// The four uniforms that resolve one customer's probabilistic choices.
///
/// Each value is guaranteed to lie in `[0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CustomerDraws {
    interarrival: f64,
    service1: f64,
    service2: f64,
    balk: f64,
}

impl CustomerDraws {
    /// Bundle four draws after checking that each one is a valid uniform sample.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] naming the offending draw if any value is outside `[0, 1)` or is NaN.
    pub fn new(interarrival: f64, service1: f64, service2: f64, balk: f64) -> Result<Self> {
        check_unit_interval("interarrival", interarrival)?;
        check_unit_interval("service 1", service1)?;
        check_unit_interval("service 2", service2)?;
        check_unit_interval("balk", balk)?;

        Ok(Self {
            interarrival,
            service1,
            service2,
            balk,
        })
    }

    /// Take the next four draws from `source`, in the order interarrival, service 1, service 2, balk.
    ///
    /// # Errors
    ///
    /// Forwards any error from the source, and returns [`Error::InvalidArgument`] if the source produced a value
    /// outside `[0, 1)`.
    pub fn take<S>(source: &mut S) -> Result<Self>
    where
        S: DrawSource + ?Sized,
    {
        let interarrival = source.next_draw()?;
        let service1 = source.next_draw()?;
        let service2 = source.next_draw()?;
        let balk = source.next_draw()?;
        Self::new(interarrival, service1, service2, balk)
    }

    pub fn interarrival(&self) -> f64 {
        self.interarrival
    }

    pub fn service1(&self) -> f64 {
        self.service1
    }

    pub fn service2(&self) -> f64 {
        self.service2
    }

    pub fn balk(&self) -> f64 {
        self.balk
    }
}

fn check_unit_interval(name: &str, draw: f64) -> Result {
    // written so that NaN fails too
    if (0.0..1.0).contains(&draw) {
        Ok(())
    } else {
        Err(Error::invalid_argument(format!(
            "{name} draw {draw} is outside [0, 1)"
        )))
    }
}
