#[derive(landingkit::form::FormModel)]
enum EnumForm {
    Email(String),
}

fn main() {}
