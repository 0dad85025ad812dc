fn main() -> Result<(), Box<dyn std::error::Error>> {
    let proto_file = "proto/portal.proto";

    // Tell cargo to recompile if the proto file changes
    println!("cargo:rerun-if-changed={}", proto_file);

    tonic_build::configure()
        .build_server(false) // The portal API is hosted; we only need the client
        .compile_protos(&[proto_file], &["proto"])?;

    Ok(())
}
