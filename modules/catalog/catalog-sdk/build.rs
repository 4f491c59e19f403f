fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=../../../proto/market/catalog/v1/catalog.proto");
    println!("cargo:rerun-if-changed=../../../proto/market/identity/v1/identity.proto");
    println!("cargo:rerun-if-changed=../../../proto/market/base/v1/base.proto");

    tonic_prost_build::configure()
        .build_client(true)
        .build_server(true)
        .extern_path(".market.base.v1", "::market_transport_grpc::proto")
        .extern_path(".market.identity.v1", "::identity_sdk::proto")
        .compile_protos(
            &["../../../proto/market/catalog/v1/catalog.proto"],
            &["../../../proto"],
        )?;

    Ok(())
}
