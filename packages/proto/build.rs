fn main() -> Result<(), Box<dyn std::error::Error>> {
    let fds = protox::compile(["proto/example.proto"], ["proto/"])?;

    // Serde derives let the fixture resolver read and write messages as JSON.
    // Unknown fields in a response fixture are rejected, not dropped.
    tonic_prost_build::configure()
        .build_server(true)
        .build_client(true)
        .type_attribute(".", "#[derive(serde::Serialize, serde::Deserialize)]")
        .type_attribute(
            ".",
            "#[serde(default, rename_all = \"camelCase\", deny_unknown_fields)]",
        )
        .compile_fds(fds)?;

    Ok(())
}
