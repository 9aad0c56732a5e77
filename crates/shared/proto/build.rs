fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Compile users manager proto
    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_protos(&["proto/users_manager.proto"], &["proto/"])?;

    Ok(())
}
