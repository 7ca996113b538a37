//! Gap-free register layouts
//!
//! A peripheral's flat register list is turned into a [`PeripheralLayout`] in four steps:
//!
//! - [`consolidate`] merges runs of indexed registers (`CTL[0]`, `CTL[1]`, ..) into one
//!   array descriptor and sorts everything by address offset
//! - [`reserved`] inserts padding wherever the address space is not contiguous
//! - [`access`] resolves the access mode of every register
//! - [`bitfield`] collects the named bit ranges of every register
//!
//! Every byte between the peripheral's base address and the end of its last register is
//! covered by exactly one field of the resulting layout.

use log::{debug, trace};
use thiserror::Error;

use crate::util::BITS_PER_BYTE;

pub mod access;
pub mod bitfield;
pub mod consolidate;
pub mod reserved;

pub use access::AccessKind;
pub use bitfield::{BitFieldDescriptor, BitFieldGroup};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error(
        "registers are not aligned: gap 0x{gap_start:04X}..0x{next:04X} is not a multiple of {width} bits"
    )]
    Alignment { gap_start: u32, next: u32, width: u32 },
    #[error("invalid register access type `{access}` for register {register}")]
    UnsupportedAccess { register: String, access: String },
    #[error("register {register} at 0x{offset:04X} overlaps the previous register ending at 0x{prev_end:04X}")]
    Overlap {
        register: String,
        offset: u32,
        prev_end: u32,
    },
    #[error("field {field} of register {register} ends at bit {high}, outside of {width} bits")]
    FieldOutOfRange {
        register: String,
        field: String,
        high: u32,
        width: u32,
    },
    #[error("register {register} is {width} bits wide, only 8, 16, 32 and 64 are supported")]
    UnsupportedWidth { register: String, width: u32 },
    #[error("register {register} at 0x{offset:04X} extends past the end of the address space")]
    AddressOverflow { register: String, offset: u32 },
}

/// A field as the descriptor source delivers it
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawField {
    pub name: String,
    pub bit_offset: u32,
    pub bit_width: u32,
}

/// A register as the descriptor source delivers it. Array members come one by one,
/// with `name` carrying the index (`CTL[2]`) and `display_name` the template (`CTL[%s]`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawRegister {
    pub address_offset: u32,
    pub bit_width: u32,
    pub display_name: String,
    pub name: String,
    pub access: Option<String>,
    pub description: String,
    pub fields: Vec<RawField>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawPeripheral {
    pub name: String,
    pub base_address: u64,
    pub registers: Vec<RawRegister>,
}

/// One addressable register, or a consolidated array of them when `repeat_count > 0`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterDescriptor {
    pub offset: u32,
    pub bit_width: u32,
    pub name: String,
    pub access: Option<String>,
    pub repeat_count: u32,
}

impl RegisterDescriptor {
    pub fn byte_width(&self) -> u32 {
        self.bit_width / BITS_PER_BYTE
    }

    pub fn is_array(&self) -> bool {
        self.repeat_count > 0
    }

    /// Address of the last byte occupied by the register (or the whole array)
    pub fn end_address(&self) -> u32 {
        self.offset + self.byte_width() * self.repeat_count.max(1) - 1
    }

    /// [`end_address`](Self::end_address), or `None` if the register is empty or does not
    /// fit in the address space
    pub fn checked_end_address(&self) -> Option<u32> {
        self.byte_width()
            .checked_mul(self.repeat_count.max(1))?
            .checked_sub(1)
            .and_then(|len| self.offset.checked_add(len))
    }
}

/// Unaddressed padding in front of a register
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReservedDescriptor {
    pub index: u32,
    pub offset: u32,
    pub byte_size: u32,
    pub element_width: u32,
}

impl ReservedDescriptor {
    /// Number of `element_width` wide elements covering the gap
    pub fn element_count(&self) -> u32 {
        self.byte_size / (self.element_width / BITS_PER_BYTE)
    }

    pub fn end_address(&self) -> u32 {
        self.offset + self.byte_size - 1
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayoutField {
    Register(RegisterDescriptor, AccessKind),
    Reserved(ReservedDescriptor),
}

impl LayoutField {
    pub fn offset(&self) -> u32 {
        match self {
            Self::Register(reg, _) => reg.offset,
            Self::Reserved(res) => res.offset,
        }
    }

    pub fn end_address(&self) -> u32 {
        match self {
            Self::Register(reg, _) => reg.end_address(),
            Self::Reserved(res) => res.end_address(),
        }
    }

    pub fn bit_width(&self) -> u32 {
        match self {
            Self::Register(reg, _) => reg.bit_width,
            Self::Reserved(res) => res.element_width,
        }
    }
}

/// Ordered, gap-free field list of one peripheral. Offsets are relative to `base_address`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeripheralLayout {
    pub name: String,
    pub base_address: u64,
    pub fields: Vec<LayoutField>,
}

impl PeripheralLayout {
    /// Relative address of the last occupied byte, `None` for a peripheral without registers
    pub fn end_address(&self) -> Option<u32> {
        self.fields.last().map(LayoutField::end_address)
    }

    pub fn address_of(&self, field: &LayoutField) -> u64 {
        self.base_address + u64::from(field.offset())
    }

    /// Same fields in the same places, whatever the peripheral is called or where it lives
    pub fn same_shape(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

/// Everything the serializer needs for one peripheral
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeripheralMap {
    pub layout: PeripheralLayout,
    pub bitfields: Vec<BitFieldGroup>,
}

/// Builds the layout and bit-field groups of `peripheral`, named `name`, stripping the
/// `strip` abbreviations from register and field names.
pub fn build<S: AsRef<str>>(
    peripheral: &RawPeripheral,
    name: &str,
    strip: &[S],
) -> Result<PeripheralMap, LayoutError> {
    debug!(
        "Building layout {} from {} registers of {}",
        name,
        peripheral.registers.len(),
        peripheral.name
    );

    if let Some(r) = peripheral
        .registers
        .iter()
        .find(|r| !matches!(r.bit_width, 8 | 16 | 32 | 64))
    {
        return Err(LayoutError::UnsupportedWidth {
            register: r.name.clone(),
            width: r.bit_width,
        });
    }

    let registers = consolidate::consolidate(&peripheral.registers, strip);
    let padding = reserved::calculate(&registers)?;

    let mut fields = Vec::with_capacity(registers.len() + padding.len());
    for reg in registers {
        let access = AccessKind::parse(&reg.name, reg.access.as_deref())?;
        trace!("Register {} at 0x{:04X}: {:?}", reg.name, reg.offset, access);
        fields.push(LayoutField::Register(reg, access));
    }
    fields.extend(padding.into_iter().map(LayoutField::Reserved));
    fields.sort_by_key(LayoutField::offset);

    let bitfields = bitfield::emit(&peripheral.registers, strip)?;

    Ok(PeripheralMap {
        layout: PeripheralLayout {
            name: name.to_string(),
            base_address: peripheral.base_address,
            fields,
        },
        bitfields,
    })
}
