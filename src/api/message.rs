//! Purpose: Bind prost-generated message types to the text-format codec.
//! Exports: `TextMessage`.
//! Role: Type parameter of every typed parse/read/write/compare entrypoint.
//! Invariants: Any prost message that reflects a pool descriptor is a `TextMessage`; nothing is hand-written per type.
//! Invariants: `from_dynamic(&m.to_dynamic()) == m` for every value `m`.
#![allow(clippy::result_large_err)]

use prost_reflect::{DynamicMessage, MessageDescriptor, ReflectMessage};

use crate::core::error::{Error, ErrorKind};

pub trait TextMessage: ReflectMessage + Default {
    fn message_descriptor() -> MessageDescriptor {
        Self::default().descriptor()
    }

    /// Fully-qualified protobuf name, e.g. `exegesis.InstructionProto`.
    fn type_name() -> String {
        Self::message_descriptor().full_name().to_string()
    }

    fn to_dynamic(&self) -> DynamicMessage {
        self.transcode_to_dynamic()
    }

    fn from_dynamic(message: &DynamicMessage) -> Result<Self, Error> {
        let expected = Self::message_descriptor();
        if message.descriptor() != expected {
            return Err(Error::new(ErrorKind::Internal).with_message(format!(
                "expected a {} message, got {}",
                expected.full_name(),
                message.descriptor().full_name()
            )));
        }
        message.transcode_to::<Self>().map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message(format!("failed to convert {}", expected.full_name()))
                .with_source(err)
        })
    }
}

impl<T: ReflectMessage + Default> TextMessage for T {}
