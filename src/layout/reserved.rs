//! Padding between non-contiguous registers

use log::trace;

use super::{LayoutError, RegisterDescriptor, ReservedDescriptor};

/// Walks registers sorted by offset and returns the padding needed in front of each one that
/// does not start right after its predecessor. A gap is padded with elements as wide as the
/// register that follows it, so it has to be a multiple of that register's width.
pub fn calculate(registers: &[RegisterDescriptor]) -> Result<Vec<ReservedDescriptor>, LayoutError> {
    let mut out = Vec::new();
    let mut end_of_previous: Option<u32> = None;

    for reg in registers {
        let end = reg
            .checked_end_address()
            .ok_or_else(|| LayoutError::AddressOverflow {
                register: reg.name.clone(),
                offset: reg.offset,
            })?;
        let overlap = |prev_end| LayoutError::Overlap {
            register: reg.name.clone(),
            offset: reg.offset,
            prev_end,
        };
        let start = match end_of_previous {
            None => 0,
            Some(prev) => prev.checked_add(1).ok_or_else(|| overlap(prev))?,
        };

        let gap = reg
            .offset
            .checked_sub(start)
            .ok_or_else(|| overlap(start - 1))?;

        if gap != 0 {
            if gap % reg.byte_width() != 0 {
                return Err(LayoutError::Alignment {
                    gap_start: start,
                    next: reg.offset,
                    width: reg.bit_width,
                });
            }

            let reserved = ReservedDescriptor {
                index: out.len() as u32,
                offset: start,
                byte_size: gap,
                element_width: reg.bit_width,
            };
            trace!(
                "Reserved {} bytes at 0x{:04X} before {}",
                reserved.byte_size,
                reserved.offset,
                reg.name
            );
            out.push(reserved);
        }

        end_of_previous = Some(end);
    }

    Ok(out)
}
