use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;

use log::{debug, warn};

use sat_portfolio_core::lit::Lit;
use sat_portfolio_core::solver::{PortfolioMember, Verdict};

use crate::control::ControlHandle;
use crate::error::PortfolioError;

/// What a race produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RaceOutcome {
    pub verdict: Verdict,
    /// Winner's model, empty unless the verdict is satisfiable.
    pub model: Vec<Lit>,
    /// Index of the member whose verdict was accepted.
    pub winner: Option<usize>,
    /// Members that panicked during the race.
    pub faults: usize,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run `f` on the member, turning a panic into [PortfolioError::InstanceFault].
fn guarded<T, F>(index: usize, f: F) -> Result<T, PortfolioError>
where
    F: FnOnce() -> T,
{
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| PortfolioError::InstanceFault {
        member: index,
        message: panic_message(payload.as_ref()),
    })
}

fn extract_model(index: usize, member: &dyn PortfolioMember, verdict: Verdict) -> Result<Vec<Lit>, PortfolioError> {
    if verdict == Verdict::Satisfiable {
        guarded(index, || member.model())
    } else {
        Ok(Vec::new())
    }
}

/// Run every member on the same assumptions and accept the first conclusive verdict.
///
/// Every spawned task is joined before this returns.
pub fn race(members: &mut [Box<dyn PortfolioMember>], assumptions: &[Lit]) -> RaceOutcome {
    let control = ControlHandle::new();
    control.register(members.iter().map(|m| m.interrupt_signal()).collect());
    race_with(members, assumptions, &control)
}

/// Like [race], with the losers cancelled through `control`, whose signals must be
/// registered in member order.
pub fn race_with(members: &mut [Box<dyn PortfolioMember>], assumptions: &[Lit], control: &ControlHandle) -> RaceOutcome {
    match members.len() {
        0 => RaceOutcome::default(),
        1 => run_alone(members[0].as_mut(), assumptions),
        _ => run_parallel(members, assumptions, control),
    }
}

fn run_alone(member: &mut dyn PortfolioMember, assumptions: &[Lit]) -> RaceOutcome {
    let outcome = guarded(0, || member.solve(assumptions))
        .and_then(|verdict| extract_model(0, member, verdict).map(|model| (verdict, model)));
    match outcome {
        Ok((verdict, model)) => RaceOutcome {
            verdict,
            model,
            winner: verdict.is_conclusive().then_some(0),
            faults: 0,
        },
        Err(e) => {
            warn!("{}", e);
            RaceOutcome {
                faults: 1,
                ..RaceOutcome::default()
            }
        }
    }
}

fn run_parallel(members: &mut [Box<dyn PortfolioMember>], assumptions: &[Lit], control: &ControlHandle) -> RaceOutcome {
    let decided = AtomicBool::new(false);
    let slot: Mutex<Option<(usize, Verdict, Vec<Lit>)>> = Mutex::new(None);
    let faults = AtomicUsize::new(0);

    thread::scope(|s| {
        for (index, member) in members.iter_mut().enumerate() {
            let (decided, slot, faults) = (&decided, &slot, &faults);
            let task = move || {
                let member = member.as_mut();
                let verdict = match guarded(index, || member.solve(assumptions)) {
                    Ok(verdict) => verdict,
                    Err(e) => {
                        warn!("{}", e);
                        faults.fetch_add(1, Ordering::SeqCst);
                        return;
                    }
                };
                debug!("Member #{} finished with {}", index, verdict);

                // Unknown never takes part in the race.
                if !verdict.is_conclusive() {
                    return;
                }
                if decided
                    .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                    .is_err()
                {
                    debug!("Member #{} lost the race", index);
                    return;
                }

                // Only the winner gets here.
                control.cancel_losers(index);
                match extract_model(index, member, verdict) {
                    Ok(model) => {
                        *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some((index, verdict, model));
                    }
                    Err(e) => {
                        warn!("{}", e);
                        faults.fetch_add(1, Ordering::SeqCst);
                    }
                }
            };
            if let Err(e) = thread::Builder::new()
                .name(format!("portfolio-{}", index))
                .spawn_scoped(s, task)
            {
                warn!("Could not spawn a task for member #{}: {}", index, e);
                faults.fetch_add(1, Ordering::SeqCst);
            }
        }
    });

    let faults = faults.into_inner();
    match slot.into_inner().unwrap_or_else(PoisonError::into_inner) {
        Some((winner, verdict, model)) => RaceOutcome {
            verdict,
            model,
            winner: Some(winner),
            faults,
        },
        None => RaceOutcome {
            faults,
            ..RaceOutcome::default()
        },
    }
}
