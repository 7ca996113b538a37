//! Register layout generator for [CMSIS-SVD] files
//!
//! [CMSIS-SVD]: http://www.keil.com/pack/doc/CMSIS/SVD/html/index.html
//!
//! A SVD file is an XML file that describes the hardware features of a
//! microcontroller. In particular, it lists all the peripherals available to the
//! device, where the registers associated to each peripheral are located in memory
//! and which bits of each register make up which field.
//!
//! `svd2regs` turns every peripheral of a SVD file into a memory-mapped layout that
//! mirrors the device's address space byte for byte, and renders it as a packed C++
//! register class plus a table of bit-field constants.
//!
//! # Usage
//!
//! ```text
//! $ svd2regs -i msp432.svd -o out --config demos/msp432.toml
//! ```
//!
//! writes one `<name>_regs.h` per peripheral layout into `out`.
//!
//! # Layouts
//!
//! Registers are sorted by address offset. Runs of indexed registers (`CCTL[0]`,
//! `CCTL[1]`, ..) become one array member, and every hole in the address space is
//! filled with a `Reserved` member made of elements as wide as the register that
//! follows it:
//!
//! ```text
//! #pragma pack(1)
//! class TimerARegisters {
//! public:
//!     ReadWrite<uint16_t> ctl;
//!     ReadWrite<uint16_t> cctlx[7];
//!     ReadWrite<uint16_t> r;
//!     ReadWrite<uint16_t> ccrx[7];
//!     ReadWrite<uint16_t> ex0;
//!     Reserved<uint16_t> _reserved0[6];
//!     ReadOnly<uint16_t> iv;
//! };
//! #pragma pack()
//! ```
//!
//! A hole that is not a multiple of the following register's width can not be
//! expressed this way and fails the peripheral, as does an access type other than
//! `read-write`, `read-only` or `write-only`. Registers without an access type are
//! `ReadWrite`.
//!
//! # Bit fields
//!
//! Every register with fields gets a namespace of `BitField` constants, except for
//! interrupt enable and set/clear interrupt flag registers, whose fields mirror the
//! interrupt flag register. A register array gets a single namespace.
//!
//! ```text
//! namespace timeraregs {
//!     namespace ctl {
//!         constexpr BitField<uint16_t> ifg{0, 0};
//!         constexpr BitField<uint16_t> ie{1, 1};
//!         constexpr BitField<uint16_t> clr{2, 2};
//!         constexpr BitField<uint16_t> mc{5, 4};
//!     }
//! }
//! ```
//!
//! # Naming
//!
//! Peripheral `TIMER_A0` is named `TimerA` and the lower-cased name is stripped from its
//! register and field names. Vendor files rarely stick to one prefix, so rules in the
//! configuration file rename peripherals and list the prefixes to strip:
//!
//! ```toml
//! [[peripheral]]
//! pattern = 'TIMER_A(\d+)'
//! name = "TimerA"
//! strip = ["timera${1}", "TA", "tax", "ta"]
//! ```
//!
//! Peripherals named alike share one header, with a `<PERIPHERAL>_BASE` constant each.

use anyhow::{Context, Result};
pub use svd_parser::svd;

pub mod config;
pub mod generate;
pub mod layout;
pub mod naming;
mod svd_adapter;
pub mod util;

pub use crate::config::{Config, SourceType};
pub use crate::generate::{Generation, Header};

/// Parses `input` as the [`SourceType`] of `config`.
pub fn load_from(input: &str, config: &Config) -> Result<svd::Device> {
    let mut device = match config.source_type {
        SourceType::Xml => {
            let mut parser_config = svd_parser::Config::default();
            parser_config.validate_level = if config.strict {
                svd::ValidateLevel::Strict
            } else {
                svd::ValidateLevel::Weak
            };

            svd_parser::parse_with_config(input, &parser_config)
                .with_context(|| "Error parsing SVD XML file".to_string())?
        }
        #[cfg(feature = "yaml")]
        SourceType::Yaml => serde_yaml::from_str(input)
            .with_context(|| "Error parsing SVD YAML file".to_string())?,
        #[cfg(feature = "json")]
        SourceType::Json => serde_json::from_str(input)
            .with_context(|| "Error parsing SVD JSON file".to_string())?,
    };
    svd_parser::expand_properties(&mut device);
    Ok(device)
}

/// Generates the register headers of every peripheral described by `input`.
pub fn generate(input: &str, config: &Config) -> Result<Generation> {
    let device = load_from(input, config)?;
    log::info!("Generating layouts for {}", device.name);
    generate::render(&device, config)
}
