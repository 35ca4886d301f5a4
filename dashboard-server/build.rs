use vergen::EmitBuilder;

fn main() -> anyhow::Result<()> {
    // Falls back to placeholder values when git metadata is unavailable.
    EmitBuilder::builder()
        .all_build()
        .all_git()
        .emit()?;

    Ok(())
}
