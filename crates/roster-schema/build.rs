fn main() {
    cynic_codegen::register_schema("crm")
        .from_sdl_file("../../schemas/crm.graphql")
        .expect("Failed to find CRM GraphQL Schema")
        .as_default()
        .expect("Failed to set CRM schema as default");
}
