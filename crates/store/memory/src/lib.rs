mod repository;

pub use repository::MemoryPortraitRepository;
