//! Packed C++ register headers
//!
//! One class per layout, laid out member by member so that a pointer to the peripheral's
//! base address can be reinterpreted as the class, followed by the bit-field constants:
//!
//! ```text
//! #pragma pack(1)
//! class Timer32Registers {
//! public:
//!     ReadWrite<uint32_t> load;
//!     Reserved<uint32_t> _reserved0[1];
//!     ReadWrite<uint32_t> ctlx[3];
//! };
//! #pragma pack()
//!
//! constexpr size_t TIMER32_1_BASE = 0x4000C000;
//!
//! namespace timer32regs {
//!     namespace ctl {
//!         constexpr BitField<uint32_t> enable{7, 7};
//!     }
//! }
//! ```

use std::collections::HashSet;
use std::fmt::Write;

use anyhow::Result;
use log::warn;

use crate::layout::{AccessKind, BitFieldGroup, LayoutField, PeripheralMap};
use crate::util;

/// A rendered header and the file it belongs in
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    pub file_name: String,
    pub text: String,
}

/// A peripheral instance sharing a layout: its SVD name and base address
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instance {
    pub name: String,
    pub base_address: u64,
}

fn wrapper(access: AccessKind) -> &'static str {
    match access {
        AccessKind::ReadWrite => "ReadWrite",
        AccessKind::ReadOnly => "ReadOnly",
        AccessKind::WriteOnly => "WriteOnly",
    }
}

fn base_name(instance: &str) -> String {
    let name: String = instance
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    format!("{name}_BASE")
}

pub fn render(map: &PeripheralMap, instances: &[Instance]) -> Result<Header> {
    let layout = &map.layout;
    let class = format!("{}Registers", layout.name);
    let mut out = String::new();

    writeln!(out, "/*")?;
    writeln!(
        out,
        " * {} register layout, generated by svd2regs v{}",
        layout.name,
        env!("CARGO_PKG_VERSION")
    )?;
    writeln!(out, " */")?;
    writeln!(out)?;
    writeln!(out, "#pragma once")?;
    writeln!(out)?;
    writeln!(out, "#include <type_traits>")?;
    writeln!(out, "#include <cstddef>")?;
    writeln!(out, "#include <cstdint>")?;
    writeln!(out)?;
    writeln!(out, "#include \"helpers.h\"")?;
    writeln!(out, "#include \"register.h\"")?;
    writeln!(out)?;
    writeln!(out, "#pragma pack(1)")?;
    writeln!(out, "class {class} {{")?;
    writeln!(out, "public:")?;
    writeln!(out, "    {class}() = delete;")?;
    writeln!(out, "    {class}({class}&) = delete;")?;
    writeln!(out, "    {class}({class}&&) = delete;")?;
    writeln!(out, "    ~{class}() = delete;")?;
    writeln!(out)?;

    let mut members = HashSet::new();
    for field in &layout.fields {
        match field {
            LayoutField::Register(reg, access) => {
                if !members.insert(reg.name.as_str()) {
                    warn!("{} has more than one register named {}", class, reg.name);
                }
                let ty = format!("{}<uint{}_t>", wrapper(*access), reg.bit_width);
                if reg.is_array() {
                    writeln!(out, "    {ty} {}[{}];", reg.name, reg.repeat_count)?;
                } else {
                    writeln!(out, "    {ty} {};", reg.name)?;
                }
            }
            LayoutField::Reserved(res) => writeln!(
                out,
                "    Reserved<uint{}_t> _reserved{}[{}];",
                res.element_width,
                res.index,
                res.element_count()
            )?,
        }
    }

    writeln!(out, "}};")?;
    writeln!(out, "#pragma pack()")?;
    writeln!(out)?;
    writeln!(
        out,
        "static_assert(std::is_standard_layout<{class}>::value, \"{class} isn't standard layout\");"
    )?;
    if let Some(end) = layout.end_address() {
        writeln!(
            out,
            "static_assert(sizeof({class}) == 0x{:X}, \"{class} has the wrong size\");",
            u64::from(end) + 1
        )?;
    }
    writeln!(out)?;
    for instance in instances {
        writeln!(
            out,
            "constexpr size_t {} = {};",
            base_name(&instance.name),
            util::hex(instance.base_address)
        )?;
    }

    if !map.bitfields.is_empty() {
        writeln!(out)?;
        writeln!(out, "namespace {}regs {{", layout.name.to_lowercase())?;
        for group in &map.bitfields {
            render_group(&mut out, group)?;
        }
        writeln!(out, "}}")?;
    }

    Ok(Header {
        file_name: format!("{}_regs.h", layout.name.to_lowercase()),
        text: out,
    })
}

fn render_group(out: &mut String, group: &BitFieldGroup) -> Result<()> {
    writeln!(out, "    namespace {} {{", group.name)?;
    for field in &group.fields {
        writeln!(
            out,
            "        constexpr BitField<uint{}_t> {}{{{}, {}}};",
            group.register_width, field.name, field.high_bit, field.low_bit
        )?;
    }
    writeln!(out, "    }}")?;
    Ok(())
}
