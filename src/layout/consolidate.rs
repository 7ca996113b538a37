//! Merges runs of indexed registers into array descriptors

use log::{trace, warn};

use super::{RawRegister, RegisterDescriptor};
use crate::util;

enum State {
    Idle,
    /// Collecting the members of an array run, starting from its first member
    Accumulating(RegisterDescriptor),
}

impl State {
    /// Leaves the current state, pushing a finished array run into `out`
    fn flush(self, out: &mut Vec<RegisterDescriptor>) {
        if let State::Accumulating(array) = self {
            trace!("Array {}[{}] at 0x{:04X}", array.name, array.repeat_count, array.offset);
            out.push(array);
        }
    }
}

/// Collapses indexed registers (`CTL[0]`, `CTL[1]`, ..) into one array descriptor per run and
/// returns all descriptors sorted by address offset.
///
/// Only the first member of a run is looked at beyond its index: the run is assumed to be
/// contiguous, with the width and access of its first member.
pub fn consolidate<S: AsRef<str>>(registers: &[RawRegister], strip: &[S]) -> Vec<RegisterDescriptor> {
    let mut out = Vec::with_capacity(registers.len());
    let mut state = State::Idle;

    for reg in registers {
        let name = util::register_name(&reg.display_name, strip);

        state = match (state, util::array_index(&reg.name)) {
            (State::Accumulating(mut array), Some(index)) if index != 0 => {
                array.repeat_count += 1;
                State::Accumulating(array)
            }
            (state, Some(index)) => {
                state.flush(&mut out);
                if index != 0 {
                    warn!(
                        "Register {} starts an array without index 0, treating it as the first member",
                        reg.name
                    );
                }
                State::Accumulating(RegisterDescriptor {
                    offset: reg.address_offset,
                    bit_width: reg.bit_width,
                    name: util::array_name(&name, "x"),
                    access: reg.access.clone(),
                    repeat_count: 1,
                })
            }
            (state, None) => {
                state.flush(&mut out);
                out.push(RegisterDescriptor {
                    offset: reg.address_offset,
                    bit_width: reg.bit_width,
                    name,
                    access: reg.access.clone(),
                    repeat_count: 0,
                });
                State::Idle
            }
        };
    }
    state.flush(&mut out);

    out.sort_by_key(|r| r.offset);
    out
}
