pub mod location_handler;

pub use location_handler::{
    __path_batch_create_locations, __path_create_location, __path_delete_locations,
    __path_list_locations, __path_move_location, __path_update_location, batch_create_locations,
    create_location, delete_locations, list_locations, move_location, update_location,
};
