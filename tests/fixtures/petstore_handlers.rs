use crate::models::pet::Pet;

pub fn list_pets() -> String {
    #[derive(Serialize)]
    struct response {
        items: Vec<Pet>,
        total: u64,
    }
    String::new()
}

pub fn create_pet() -> String {
    #[derive(Serialize)]
    struct response {
        id: i64,
    }
    String::new()
}
