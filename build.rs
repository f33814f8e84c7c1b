//! Build script for generating Rust code from Protocol Buffer definitions.
//!
//! Compiles `proto/instructions.proto` into prost types and writes the
//! encoded file descriptor set next to them, so the text-format codec can
//! reflect over the same schema the types were generated from.

use std::env;
use std::fs;
use std::path::PathBuf;

use prost::Message;

const PROTO_FILES: &[&str] = &["instructions.proto"];
const PROTO_INCLUDE: &str = "proto";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Tell Cargo to re-run if proto files change
    for file in PROTO_FILES {
        println!("cargo:rerun-if-changed={PROTO_INCLUDE}/{file}");
    }

    let out_dir = PathBuf::from(env::var("OUT_DIR")?);

    // protox parses the schema in-process, so no system protoc is needed
    let file_descriptors = protox::compile(PROTO_FILES, [PROTO_INCLUDE])?;
    fs::write(
        out_dir.join("file_descriptor_set.bin"),
        file_descriptors.encode_to_vec(),
    )?;

    let mut config = prost_build::Config::new();
    // Generate BTreeMap instead of HashMap for deterministic ordering
    config.btree_map(["."]);
    for file in &file_descriptors.file {
        for message in &file.message_type {
            let full_name = format!("{}.{}", file.package(), message.name());
            // message_attribute, unlike type_attribute, skips the nested enums
            config.message_attribute(
                format!(".{full_name}"),
                format!(
                    "#[derive(::prost_reflect::ReflectMessage)]\n\
                     #[prost_reflect(descriptor_pool = \"crate::proto::DESCRIPTOR_POOL\", message_name = \"{full_name}\")]"
                ),
            );
        }
    }
    config.compile_fds(file_descriptors)?;

    Ok(())
}
