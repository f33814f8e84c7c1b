//! Purpose: Message schemas compiled into this crate and the descriptor pool behind them.
//! Exports: `instructions` (prost-generated types), `DESCRIPTOR_POOL`, `message_types`, `find_message_type`.
//! Role: Lets the codec reflect over generated types and the CLI resolve `--type NAME`.
//! Invariants: Every generated message type resolves in `DESCRIPTOR_POOL` under its full name.
//! Notes: `build.rs` compiles `proto/*.proto` into `OUT_DIR`; nothing generated is checked in.

use std::sync::LazyLock;

use prost_reflect::{DescriptorPool, MessageDescriptor};

#[allow(clippy::all, clippy::pedantic, missing_docs)]
pub mod instructions {
    include!(concat!(env!("OUT_DIR"), "/exegesis.rs"));

    pub use instruction_operand::{AddressingMode, Encoding};
}

const FILE_DESCRIPTOR_SET: &[u8] =
    include_bytes!(concat!(env!("OUT_DIR"), "/file_descriptor_set.bin"));

/// Pool for every schema in `proto/`; the generated types' `ReflectMessage` impls resolve here.
pub static DESCRIPTOR_POOL: LazyLock<DescriptorPool> = LazyLock::new(|| {
    DescriptorPool::decode(FILE_DESCRIPTOR_SET).expect("build.rs writes a valid descriptor set")
});

/// Message types in declaration order.
pub fn message_types() -> Vec<MessageDescriptor> {
    DESCRIPTOR_POOL.all_messages().collect()
}

/// Resolves a full (`exegesis.InstructionProto`) or short (`InstructionProto`) type name.
pub fn find_message_type(name: &str) -> Option<MessageDescriptor> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    DESCRIPTOR_POOL
        .all_messages()
        .find(|descriptor| descriptor.full_name() == name || descriptor.name() == name)
}

#[cfg(test)]
mod tests {
    use super::{find_message_type, message_types};
    use crate::proto::instructions::{
        AddressingMode, Encoding, InstructionFormat, InstructionOperand, InstructionProto,
        InstructionSetProto,
    };
    use prost_reflect::ReflectMessage;

    #[test]
    fn resolves_full_and_short_names() {
        let full = find_message_type("exegesis.InstructionProto").expect("full");
        let short = find_message_type(" InstructionProto ").expect("short");
        assert_eq!(full, short);
        assert_eq!(full, InstructionProto::default().descriptor());
    }

    #[test]
    fn unknown_names_are_none() {
        assert!(find_message_type("exegesis.Missing").is_none());
        assert!(find_message_type("").is_none());
    }

    #[test]
    fn registry_lists_every_generated_type_once() {
        let names = message_types()
            .iter()
            .map(|descriptor| descriptor.full_name().to_string())
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            [
                "exegesis.InstructionOperand",
                "exegesis.InstructionFormat",
                "exegesis.InstructionProto",
                "exegesis.InstructionSetProto",
            ]
        );
        assert_eq!(
            InstructionOperand::default().descriptor().full_name(),
            "exegesis.InstructionOperand"
        );
        assert_eq!(
            InstructionFormat::default().descriptor().full_name(),
            "exegesis.InstructionFormat"
        );
        assert_eq!(
            InstructionSetProto::default().descriptor().full_name(),
            "exegesis.InstructionSetProto"
        );
    }

    #[test]
    fn enum_numbers_match_descriptor() {
        let operand = InstructionOperand::default().descriptor();
        let encoding = operand
            .get_field_by_name("encoding")
            .and_then(|field| field.kind().as_enum().cloned())
            .expect("encoding enum");
        let vex = encoding.get_value_by_name("VEX_V_ENCODING").expect("value");
        assert_eq!(vex.number(), Encoding::VexVEncoding as i32);
        assert_eq!(AddressingMode::IndirectAddressing as i32, 3);
        assert_eq!(
            AddressingMode::from_str_name("BLOCK_DIRECT_ADDRESSING"),
            Some(AddressingMode::BlockDirectAddressing)
        );
    }
}
