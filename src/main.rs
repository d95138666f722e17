use block_patch::{create_patch_application, output::output_results};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let app = create_patch_application()?;

    if app.writes_default_config() {
        return app.write_default_config();
    }

    let report = app.run()?;
    output_results(&report)?;
    app.check_outcome(&report)?;
    Ok(())
}
