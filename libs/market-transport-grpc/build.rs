fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=../../proto/market/base/v1/base.proto");

    tonic_prost_build::configure()
        .build_client(false)
        .build_server(false)
        .compile_protos(&["../../proto/market/base/v1/base.proto"], &["../../proto"])?;

    Ok(())
}
