pub mod view_dto;
