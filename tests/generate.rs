use svd2regs::naming::PeripheralRule;
use svd2regs::{generate, Config};

const SVD: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<device schemaVersion="1.1">
  <name>TEST</name>
  <version>1.0</version>
  <description>Test device</description>
  <addressUnitBits>8</addressUnitBits>
  <width>32</width>
  <size>32</size>
  <access>read-write</access>
  <peripherals>
    <peripheral>
      <name>TIMER_A0</name>
      <baseAddress>0x40000000</baseAddress>
      <registers>
        <register>
          <name>TA0CTL</name>
          <description>TimerAx Control Register</description>
          <addressOffset>0x00</addressOffset>
          <size>16</size>
          <access>read-write</access>
          <fields>
            <field><name>TASSEL</name><bitOffset>8</bitOffset><bitWidth>2</bitWidth></field>
            <field><name>ID</name><bitOffset>6</bitOffset><bitWidth>2</bitWidth></field>
            <field><name>MC</name><bitOffset>4</bitOffset><bitWidth>2</bitWidth></field>
            <field><name>TACLR</name><bitOffset>2</bitOffset><bitWidth>1</bitWidth></field>
            <field><name>TAIE</name><bitOffset>1</bitOffset><bitWidth>1</bitWidth></field>
            <field><name>TAIFG</name><bitOffset>0</bitOffset><bitWidth>1</bitWidth></field>
          </fields>
        </register>
        <register>
          <dim>3</dim>
          <dimIncrement>0x2</dimIncrement>
          <name>TA0CCTL[%s]</name>
          <description>Timer_A Capture/Compare Control Register</description>
          <addressOffset>0x02</addressOffset>
          <size>16</size>
          <access>read-write</access>
          <fields>
            <field><name>CCIE</name><bitOffset>4</bitOffset><bitWidth>1</bitWidth></field>
            <field><name>CCIFG</name><bitOffset>0</bitOffset><bitWidth>1</bitWidth></field>
          </fields>
        </register>
        <register>
          <name>TA0R</name>
          <description>TimerA register</description>
          <addressOffset>0x08</addressOffset>
          <size>16</size>
          <access>read-write</access>
        </register>
        <register>
          <name>TA0IV</name>
          <description>TimerAx Interrupt Vector Register</description>
          <addressOffset>0x0E</addressOffset>
          <size>16</size>
          <access>read-only</access>
        </register>
      </registers>
    </peripheral>
    <peripheral derivedFrom="TIMER_A0">
      <name>TIMER_A1</name>
      <baseAddress>0x40000400</baseAddress>
    </peripheral>
    <peripheral>
      <name>BAD</name>
      <baseAddress>0x40001000</baseAddress>
      <registers>
        <register>
          <name>A</name>
          <addressOffset>0x00</addressOffset>
          <size>32</size>
        </register>
        <register>
          <name>B</name>
          <addressOffset>0x07</addressOffset>
          <size>32</size>
        </register>
      </registers>
    </peripheral>
    <peripheral>
      <name>WDT_A</name>
      <baseAddress>0x40004800</baseAddress>
      <registers>
        <register>
          <name>WDTCTL</name>
          <description>Watchdog Timer Control Register</description>
          <addressOffset>0x0C</addressOffset>
          <size>16</size>
        </register>
      </registers>
    </peripheral>
  </peripherals>
</device>
"#;

fn config() -> Config {
    Config {
        peripherals: vec![PeripheralRule {
            pattern: r"TIMER_A(\d+)".into(),
            name: "TimerA".into(),
            strip: vec!["ta0".into(), "ta".into()],
        }],
        ..Default::default()
    }
}

#[test]
fn generates_one_header_per_layout() {
    let generation = generate(SVD, &config()).unwrap();

    let files: Vec<_> = generation.headers.iter().map(|h| h.file_name.as_str()).collect();
    assert_eq!(files, vec!["timera_regs.h", "wdta_regs.h"]);
    assert_eq!(generation.failed.len(), 1);
    assert_eq!(generation.failed[0].0, "BAD");
    assert!(generation.failed[0].1.contains("not aligned"));
}

#[test]
fn timer_layout() {
    let generation = generate(SVD, &config()).unwrap();
    let text = &generation.headers[0].text;

    assert!(text.contains(
        "    ReadWrite<uint16_t> ctl;
    ReadWrite<uint16_t> cctlx[3];
    ReadWrite<uint16_t> r;
    Reserved<uint16_t> _reserved0[2];
    ReadOnly<uint16_t> iv;
};"
    ));
    assert!(text.contains("static_assert(sizeof(TimerARegisters) == 0x10,"));
    assert!(text.contains("constexpr size_t TIMER_A0_BASE = 0x40000000;\n"));
    assert!(text.contains("constexpr size_t TIMER_A1_BASE = 0x40000400;\n"));
    assert!(text.contains(
        "namespace timeraregs {
    namespace ctl {
        constexpr BitField<uint16_t> ssel{9, 8};
        constexpr BitField<uint16_t> id{7, 6};
        constexpr BitField<uint16_t> mc{5, 4};
        constexpr BitField<uint16_t> clr{2, 2};
        constexpr BitField<uint16_t> ie{1, 1};
        constexpr BitField<uint16_t> ifg{0, 0};
    }
    namespace cctl {
        constexpr BitField<uint16_t> ccie{4, 4};
        constexpr BitField<uint16_t> ccifg{0, 0};
    }
}
"
    ));
}

#[test]
fn leading_gap_is_reserved() {
    let generation = generate(SVD, &config()).unwrap();
    let text = &generation.headers[1].text;

    assert!(text.contains(
        "    Reserved<uint16_t> _reserved0[6];
    ReadWrite<uint16_t> wdtctl;
};"
    ));
    assert!(text.contains("constexpr size_t WDT_A_BASE = 0x40004800;\n"));
    assert!(!text.contains("namespace"));
}

#[test]
fn fail_fast_aborts_on_first_failure() {
    let config = Config {
        fail_fast: true,
        ..config()
    };
    let err = generate(SVD, &config).unwrap_err();
    assert!(format!("{err:#}").contains("BAD"));
}

#[test]
fn output_is_deterministic() {
    assert_eq!(
        generate(SVD, &config()).unwrap(),
        generate(SVD, &config()).unwrap()
    );
}

const SHAPES: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<device schemaVersion="1.1">
  <name>SHAPES</name>
  <version>1.0</version>
  <description>Register shapes</description>
  <addressUnitBits>8</addressUnitBits>
  <width>32</width>
  <size>32</size>
  <access>read-write</access>
  <peripherals>
    <peripheral>
      <name>DMA</name>
      <baseAddress>0x40002000</baseAddress>
      <registers>
        <register>
          <name>CTL</name>
          <description>Control</description>
          <addressOffset>0x0</addressOffset>
          <size>32</size>
        </register>
        <cluster>
          <name>CH</name>
          <description>Channel</description>
          <addressOffset>0x4</addressOffset>
          <register>
            <name>SRC</name>
            <description>Source</description>
            <addressOffset>0x0</addressOffset>
            <size>32</size>
          </register>
          <register>
            <name>DST</name>
            <description>Destination</description>
            <addressOffset>0x4</addressOffset>
            <size>32</size>
          </register>
        </cluster>
        <register>
          <name>STAT</name>
          <description>Status</description>
          <addressOffset>0xC</addressOffset>
          <size>32</size>
          <access>read-only</access>
        </register>
      </registers>
    </peripheral>
    <peripheral>
      <name>CHAN</name>
      <baseAddress>0x40003000</baseAddress>
      <registers>
        <cluster>
          <dim>2</dim>
          <dimIncrement>0x8</dimIncrement>
          <name>CH[%s]</name>
          <description>Channel</description>
          <addressOffset>0x0</addressOffset>
          <register>
            <name>SRC</name>
            <description>Source</description>
            <addressOffset>0x0</addressOffset>
            <size>32</size>
          </register>
          <register>
            <name>DST</name>
            <description>Destination</description>
            <addressOffset>0x4</addressOffset>
            <size>32</size>
          </register>
        </cluster>
      </registers>
    </peripheral>
    <peripheral>
      <name>PORT</name>
      <baseAddress>0x40004000</baseAddress>
      <registers>
        <register>
          <dim>2</dim>
          <dimIncrement>0x1</dimIncrement>
          <dimIndex>A,B</dimIndex>
          <name>PIN%s</name>
          <description>Input</description>
          <addressOffset>0x0</addressOffset>
          <size>8</size>
          <access>read-only</access>
        </register>
        <register>
          <dim>2</dim>
          <dimIncrement>0x1</dimIncrement>
          <name>OUT%s</name>
          <description>Output</description>
          <addressOffset>0x2</addressOffset>
          <size>8</size>
        </register>
        <register>
          <name>PORTCTL</name>
          <description>Port Control</description>
          <addressOffset>0x4</addressOffset>
          <size>8</size>
          <fields>
            <field>
              <dim>3</dim>
              <dimIncrement>1</dimIncrement>
              <name>EN%s</name>
              <bitOffset>0</bitOffset>
              <bitWidth>1</bitWidth>
            </field>
            <field><name>MODE</name><bitOffset>4</bitOffset><bitWidth>3</bitWidth></field>
          </fields>
        </register>
      </registers>
    </peripheral>
    <peripheral>
      <name>ODD</name>
      <baseAddress>0x40005000</baseAddress>
      <registers>
        <register>
          <name>WIDE</name>
          <addressOffset>0x0</addressOffset>
          <size>24</size>
        </register>
      </registers>
    </peripheral>
    <peripheral>
      <name>UART0</name>
      <baseAddress>0x40006000</baseAddress>
      <registers>
        <register>
          <name>DATA</name>
          <addressOffset>0x0</addressOffset>
          <size>8</size>
        </register>
      </registers>
    </peripheral>
    <peripheral>
      <name>UART1</name>
      <baseAddress>0x40006400</baseAddress>
      <registers>
        <register>
          <name>DATA</name>
          <addressOffset>0x0</addressOffset>
          <size>8</size>
        </register>
        <register>
          <name>STAT</name>
          <addressOffset>0x1</addressOffset>
          <size>8</size>
        </register>
      </registers>
    </peripheral>
  </peripherals>
</device>
"#;

fn shapes() -> svd2regs::Generation {
    let config = Config {
        peripherals: vec![PeripheralRule {
            pattern: r"UART\d".into(),
            name: "Uart".into(),
            strip: vec!["uart".into()],
        }],
        ..Default::default()
    };
    generate(SHAPES, &config).unwrap()
}

fn header<'a>(generation: &'a svd2regs::Generation, file_name: &str) -> &'a str {
    &generation
        .headers
        .iter()
        .find(|h| h.file_name == file_name)
        .unwrap_or_else(|| panic!("no {file_name}"))
        .text
}

#[test]
fn cluster_registers_are_flattened() {
    let generation = shapes();
    let text = header(&generation, "dma_regs.h");

    assert!(text.contains(
        "    ReadWrite<uint32_t> ctl;
    ReadWrite<uint32_t> src;
    ReadWrite<uint32_t> dst;
    ReadOnly<uint32_t> stat;
};"
    ));
    assert!(!text.contains("Reserved"));
}

#[test]
fn cluster_arrays_prefix_their_members() {
    let generation = shapes();
    let text = header(&generation, "chan_regs.h");

    assert!(text.contains(
        "    ReadWrite<uint32_t> ch0_src;
    ReadWrite<uint32_t> ch0_dst;
    ReadWrite<uint32_t> ch1_src;
    ReadWrite<uint32_t> ch1_dst;
};"
    ));
    assert!(text.contains("static_assert(sizeof(ChanRegisters) == 0x10,"));
}

#[test]
fn lettered_and_unbracketed_arrays_are_scalars() {
    let generation = shapes();
    let text = header(&generation, "port_regs.h");

    assert!(text.contains(
        "    ReadOnly<uint8_t> pina;
    ReadOnly<uint8_t> pinb;
    ReadWrite<uint8_t> out0;
    ReadWrite<uint8_t> out1;
    ReadWrite<uint8_t> ctl;
};"
    ));
}

#[test]
fn field_arrays_are_expanded() {
    let generation = shapes();
    let text = header(&generation, "port_regs.h");

    assert!(text.contains(
        "    namespace ctl {
        constexpr BitField<uint8_t> en0{0, 0};
        constexpr BitField<uint8_t> en1{1, 1};
        constexpr BitField<uint8_t> en2{2, 2};
        constexpr BitField<uint8_t> mode{6, 4};
    }"
    ));
}

#[test]
fn odd_register_width_fails_the_peripheral() {
    let generation = shapes();

    let (_, reason) = generation
        .failed
        .iter()
        .find(|(name, _)| name == "ODD")
        .expect("ODD is not reported");
    assert!(reason.contains("24 bits wide"), "{reason}");
    assert!(generation.headers.iter().all(|h| h.file_name != "odd_regs.h"));
}

#[test]
fn same_name_with_another_layout_is_reported() {
    let generation = shapes();

    let (_, reason) = generation
        .failed
        .iter()
        .find(|(name, _)| name == "UART1")
        .expect("UART1 is not reported");
    assert!(reason.contains("layout differs"), "{reason}");

    let text = header(&generation, "uart_regs.h");
    assert!(text.contains("constexpr size_t UART0_BASE = 0x40006000;\n"));
    assert!(!text.contains("UART1_BASE"));
    assert!(!text.contains(" stat;"));
}

#[test]
fn same_name_with_another_layout_fails_fast() {
    let config = Config {
        fail_fast: true,
        peripherals: vec![PeripheralRule {
            pattern: r"UART\d".into(),
            name: "Uart".into(),
            strip: vec!["uart".into()],
        }],
        ..Default::default()
    };
    let shapes = SHAPES.replace("<size>24</size>", "<size>32</size>");
    let err = generate(&shapes, &config).unwrap_err();
    assert!(format!("{err:#}").contains("UART1"));
}
