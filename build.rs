fn main() {
    cynic_codegen::register_schema("crm")
        .from_sdl_file("schemas/crm.graphql")
        .expect("failed to load crm.graphql schema file")
        .as_default()
        .expect("failed to register crm schema as default");
}
