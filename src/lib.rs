pub mod arq;
pub mod sim;
pub mod viz;

#[cfg(test)]
mod test;
