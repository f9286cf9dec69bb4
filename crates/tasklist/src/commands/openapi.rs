use shared::error::CommonError;
use tasklist_api_server::router::generate_openapi_spec;

pub fn cmd_openapi_spec() -> Result<(), CommonError> {
    let spec = generate_openapi_spec();
    let json = spec.to_pretty_json()?;
    println!("{json}");
    Ok(())
}
