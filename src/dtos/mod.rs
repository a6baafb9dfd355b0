pub mod userkycdtos;
pub mod vaccinedtos;
