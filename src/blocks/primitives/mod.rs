pub mod block;
pub mod changeset;
pub mod dense_info;
pub mod dense_nodes;
pub mod group;
pub mod info;
pub mod member_type;
pub mod node;
pub mod relation;
pub mod way;

pub use block::PrimitiveBlock;
pub use changeset::ChangeSet;
pub use dense_info::DenseInfo;
pub use dense_nodes::DenseNodes;
pub use group::PrimitiveGroup;
pub use info::Info;
pub use member_type::MemberType;
pub use node::Node;
pub use relation::Relation;
pub use way::Way;
