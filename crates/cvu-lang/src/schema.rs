//! Enum-keyed registries of known view properties, UI elements, element
//! properties and actions, with the value shapes each accepts.

use crate::parser::ast::PropertyValue;

/// The shape a property value is expected to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// A string or bare word.
    Text,
    /// A number.
    Number,
    /// A boolean.
    Bool,
    /// A hex color or the name of a color definition.
    Color,
    /// A list of values (a single value counts as a one-element list).
    List,
    /// A nested object.
    Object,
    /// A single action: a name or a named object.
    Action,
    /// One action or a list of actions.
    ActionList,
    /// Anything.
    Any,
}

impl ValueShape {
    /// Returns `true` if `value` fits this shape. Expressions and `nil`
    /// always fit since their type is only known at runtime.
    #[must_use]
    pub fn accepts(self, value: &PropertyValue) -> bool {
        if matches!(value, PropertyValue::Expression(_) | PropertyValue::Nil) {
            return true;
        }
        match self {
            Self::Text => matches!(value, PropertyValue::String(_)),
            Self::Number => matches!(value, PropertyValue::Number(_)),
            Self::Bool => matches!(value, PropertyValue::Bool(_)),
            Self::Color => matches!(value, PropertyValue::Color(_) | PropertyValue::String(_)),
            Self::Object => matches!(value, PropertyValue::Object(_)),
            Self::Action => matches!(value, PropertyValue::String(_) | PropertyValue::Object(_)),
            Self::ActionList => match value {
                PropertyValue::Array(items) => items.iter().all(|i| Self::Action.accepts(i)),
                other => Self::Action.accepts(other),
            },
            Self::List | Self::Any => true,
        }
    }

    /// Returns `true` for shapes whose values are actions.
    #[must_use]
    pub const fn holds_actions(self) -> bool {
        matches!(self, Self::Action | Self::ActionList)
    }
}

/// Properties understood on view definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewProperty {
    /// `title`
    Title,
    /// `subtitle`
    Subtitle,
    /// `name`
    Name,
    /// `icon`
    Icon,
    /// `emptyResultText`
    EmptyResultText,
    /// `searchHint`
    SearchHint,
    /// `showLabels`
    ShowLabels,
    /// `defaultRenderer`
    DefaultRenderer,
    /// `sortFields`
    SortFields,
    /// `filterButtons`
    FilterButtons,
    /// `contextButtons`
    ContextButtons,
    /// `actionButton`
    ActionButton,
    /// `editActionButton`
    EditActionButton,
    /// `userState`
    UserState,
    /// `viewArguments`
    ViewArguments,
    /// `datasource`
    Datasource,
    /// `readOnly`
    ReadOnly,
    /// `showSortInEditMode`
    ShowSortInEditMode,
    /// `showContextualBarInEditMode`
    ShowContextualBarInEditMode,
    /// `navigateItems`
    NavigateItems,
    /// `views` (sessions)
    Views,
    /// `currentViewIndex` (sessions)
    CurrentViewIndex,
}

impl ViewProperty {
    /// Every view property.
    pub const ALL: [Self; 22] = [
        Self::Title,
        Self::Subtitle,
        Self::Name,
        Self::Icon,
        Self::EmptyResultText,
        Self::SearchHint,
        Self::ShowLabels,
        Self::DefaultRenderer,
        Self::SortFields,
        Self::FilterButtons,
        Self::ContextButtons,
        Self::ActionButton,
        Self::EditActionButton,
        Self::UserState,
        Self::ViewArguments,
        Self::Datasource,
        Self::ReadOnly,
        Self::ShowSortInEditMode,
        Self::ShowContextualBarInEditMode,
        Self::NavigateItems,
        Self::Views,
        Self::CurrentViewIndex,
    ];

    /// Property key as written in source.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Subtitle => "subtitle",
            Self::Name => "name",
            Self::Icon => "icon",
            Self::EmptyResultText => "emptyResultText",
            Self::SearchHint => "searchHint",
            Self::ShowLabels => "showLabels",
            Self::DefaultRenderer => "defaultRenderer",
            Self::SortFields => "sortFields",
            Self::FilterButtons => "filterButtons",
            Self::ContextButtons => "contextButtons",
            Self::ActionButton => "actionButton",
            Self::EditActionButton => "editActionButton",
            Self::UserState => "userState",
            Self::ViewArguments => "viewArguments",
            Self::Datasource => "datasource",
            Self::ReadOnly => "readOnly",
            Self::ShowSortInEditMode => "showSortInEditMode",
            Self::ShowContextualBarInEditMode => "showContextualBarInEditMode",
            Self::NavigateItems => "navigateItems",
            Self::Views => "views",
            Self::CurrentViewIndex => "currentViewIndex",
        }
    }

    /// Looks up a property by key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.key() == key)
    }

    /// Shape the value must have.
    #[must_use]
    pub const fn shape(self) -> ValueShape {
        match self {
            Self::Title
            | Self::Subtitle
            | Self::Name
            | Self::Icon
            | Self::EmptyResultText
            | Self::SearchHint
            | Self::DefaultRenderer => ValueShape::Text,
            Self::ShowLabels
            | Self::ReadOnly
            | Self::ShowSortInEditMode
            | Self::ShowContextualBarInEditMode
            | Self::NavigateItems => ValueShape::Bool,
            Self::SortFields | Self::Views => ValueShape::List,
            Self::FilterButtons | Self::ContextButtons => ValueShape::ActionList,
            Self::ActionButton | Self::EditActionButton => ValueShape::Action,
            Self::UserState | Self::ViewArguments | Self::Datasource => ValueShape::Object,
            Self::CurrentViewIndex => ValueShape::Number,
        }
    }
}

/// UI element kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Vertical stack.
    VStack,
    /// Horizontal stack.
    HStack,
    /// Overlapping stack.
    ZStack,
    /// Wrapping flow of children.
    FlowStack,
    /// Static or bound text.
    Text,
    /// Editable text field.
    Textfield,
    /// Editable rich text.
    RichTextfield,
    /// Image from a file or a system icon.
    Image,
    /// Pressable button.
    Button,
    /// A button bound to an action.
    ActionButton,
    /// Flexible space.
    Spacer,
    /// Thin separating line.
    Divider,
    /// Full-width separating line.
    HorizontalLine,
    /// Boolean switch.
    Toggle,
    /// Option picker.
    Picker,
    /// Map of locations.
    Map,
    /// Grid of children.
    Grid,
    /// Nested renderer for one item.
    ItemCell,
    /// Embedded view.
    SubView,
    /// Section of an editor.
    EditorSection,
    /// Row of an editor.
    EditorRow,
    /// Circle shape.
    Circle,
    /// Rectangle shape.
    Rectangle,
    /// Renders nothing.
    Empty,
}

impl ElementKind {
    /// Every element kind.
    pub const ALL: [Self; 24] = [
        Self::VStack,
        Self::HStack,
        Self::ZStack,
        Self::FlowStack,
        Self::Text,
        Self::Textfield,
        Self::RichTextfield,
        Self::Image,
        Self::Button,
        Self::ActionButton,
        Self::Spacer,
        Self::Divider,
        Self::HorizontalLine,
        Self::Toggle,
        Self::Picker,
        Self::Map,
        Self::Grid,
        Self::ItemCell,
        Self::SubView,
        Self::EditorSection,
        Self::EditorRow,
        Self::Circle,
        Self::Rectangle,
        Self::Empty,
    ];

    /// Element name as written in source.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::VStack => "VStack",
            Self::HStack => "HStack",
            Self::ZStack => "ZStack",
            Self::FlowStack => "FlowStack",
            Self::Text => "Text",
            Self::Textfield => "Textfield",
            Self::RichTextfield => "RichTextfield",
            Self::Image => "Image",
            Self::Button => "Button",
            Self::ActionButton => "ActionButton",
            Self::Spacer => "Spacer",
            Self::Divider => "Divider",
            Self::HorizontalLine => "HorizontalLine",
            Self::Toggle => "Toggle",
            Self::Picker => "Picker",
            Self::Map => "Map",
            Self::Grid => "Grid",
            Self::ItemCell => "ItemCell",
            Self::SubView => "SubView",
            Self::EditorSection => "EditorSection",
            Self::EditorRow => "EditorRow",
            Self::Circle => "Circle",
            Self::Rectangle => "Rectangle",
            Self::Empty => "Empty",
        }
    }

    /// Looks up an element kind by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

/// Properties understood on UI elements and styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementProperty {
    /// `text`
    Text,
    /// `title`
    Title,
    /// `image`
    Image,
    /// `systemName`
    SystemName,
    /// `font`
    Font,
    /// `color`
    Color,
    /// `background`
    Background,
    /// `fill`
    Fill,
    /// `padding`
    Padding,
    /// `spacing`
    Spacing,
    /// `alignment`
    Alignment,
    /// `textAlign`
    TextAlign,
    /// `width`
    Width,
    /// `height`
    Height,
    /// `minWidth`
    MinWidth,
    /// `maxWidth`
    MaxWidth,
    /// `minHeight`
    MinHeight,
    /// `maxHeight`
    MaxHeight,
    /// `cornerRadius`
    CornerRadius,
    /// `border`
    Border,
    /// `shadow`
    Shadow,
    /// `opacity`
    Opacity,
    /// `lineLimit`
    LineLimit,
    /// `bold`
    Bold,
    /// `italic`
    Italic,
    /// `underline`
    Underline,
    /// `show`
    Show,
    /// `onPress`
    OnPress,
    /// `value`
    Value,
    /// `hint`
    Hint,
    /// `style`
    Style,
    /// `zIndex`
    ZIndex,
    /// `resizable`
    Resizable,
    /// `cornerborder`, replaced by `border`.
    CornerBorder,
    /// `align`, replaced by `alignment`.
    Align,
}

impl ElementProperty {
    /// Every element property, deprecated ones included.
    pub const ALL: [Self; 35] = [
        Self::Text,
        Self::Title,
        Self::Image,
        Self::SystemName,
        Self::Font,
        Self::Color,
        Self::Background,
        Self::Fill,
        Self::Padding,
        Self::Spacing,
        Self::Alignment,
        Self::TextAlign,
        Self::Width,
        Self::Height,
        Self::MinWidth,
        Self::MaxWidth,
        Self::MinHeight,
        Self::MaxHeight,
        Self::CornerRadius,
        Self::Border,
        Self::Shadow,
        Self::Opacity,
        Self::LineLimit,
        Self::Bold,
        Self::Italic,
        Self::Underline,
        Self::Show,
        Self::OnPress,
        Self::Value,
        Self::Hint,
        Self::Style,
        Self::ZIndex,
        Self::Resizable,
        Self::CornerBorder,
        Self::Align,
    ];

    /// Property key as written in source.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Title => "title",
            Self::Image => "image",
            Self::SystemName => "systemName",
            Self::Font => "font",
            Self::Color => "color",
            Self::Background => "background",
            Self::Fill => "fill",
            Self::Padding => "padding",
            Self::Spacing => "spacing",
            Self::Alignment => "alignment",
            Self::TextAlign => "textAlign",
            Self::Width => "width",
            Self::Height => "height",
            Self::MinWidth => "minWidth",
            Self::MaxWidth => "maxWidth",
            Self::MinHeight => "minHeight",
            Self::MaxHeight => "maxHeight",
            Self::CornerRadius => "cornerRadius",
            Self::Border => "border",
            Self::Shadow => "shadow",
            Self::Opacity => "opacity",
            Self::LineLimit => "lineLimit",
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Underline => "underline",
            Self::Show => "show",
            Self::OnPress => "onPress",
            Self::Value => "value",
            Self::Hint => "hint",
            Self::Style => "style",
            Self::ZIndex => "zIndex",
            Self::Resizable => "resizable",
            Self::CornerBorder => "cornerborder",
            Self::Align => "align",
        }
    }

    /// Looks up a property by key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.key() == key)
    }

    /// The property that replaces a deprecated one.
    #[must_use]
    pub const fn replacement(self) -> Option<Self> {
        match self {
            Self::CornerBorder => Some(Self::Border),
            Self::Align => Some(Self::Alignment),
            _ => None,
        }
    }

    /// Shape the value must have.
    #[must_use]
    pub const fn shape(self) -> ValueShape {
        match self {
            Self::Text | Self::Title | Self::Image | Self::SystemName | Self::Hint => {
                ValueShape::Text
            }
            Self::Alignment | Self::TextAlign | Self::Align => ValueShape::Text,
            Self::Color | Self::Background | Self::Fill => ValueShape::Color,
            Self::Spacing
            | Self::Width
            | Self::Height
            | Self::MinWidth
            | Self::MinHeight
            | Self::CornerRadius
            | Self::Opacity
            | Self::LineLimit
            | Self::ZIndex => ValueShape::Number,
            Self::Bold | Self::Italic | Self::Underline | Self::Show => ValueShape::Bool,
            Self::OnPress => ValueShape::Action,
            Self::Font
            | Self::Padding
            | Self::MaxWidth
            | Self::MaxHeight
            | Self::Border
            | Self::CornerBorder
            | Self::Shadow
            | Self::Value
            | Self::Style
            | Self::Resizable => ValueShape::Any,
        }
    }
}

/// Arguments an action may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionArgument {
    /// `view`: a view name or inline view.
    View,
    /// `viewArguments`
    ViewArguments,
    /// `title`
    Title,
    /// `icon`
    Icon,
    /// `name`
    Name,
    /// `session`
    Session,
    /// `template`
    Template,
    /// `type`
    Type,
    /// `confirm`
    Confirm,
    /// `property`
    Property,
    /// `value`
    Value,
}

impl ActionArgument {
    /// Every action argument.
    pub const ALL: [Self; 11] = [
        Self::View,
        Self::ViewArguments,
        Self::Title,
        Self::Icon,
        Self::Name,
        Self::Session,
        Self::Template,
        Self::Type,
        Self::Confirm,
        Self::Property,
        Self::Value,
    ];

    /// Argument key as written in source.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::ViewArguments => "viewArguments",
            Self::Title => "title",
            Self::Icon => "icon",
            Self::Name => "name",
            Self::Session => "session",
            Self::Template => "template",
            Self::Type => "type",
            Self::Confirm => "confirm",
            Self::Property => "property",
            Self::Value => "value",
        }
    }

    /// Looks up an argument by key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.key() == key)
    }

    /// Shape the value must have.
    #[must_use]
    pub const fn shape(self) -> ValueShape {
        match self {
            Self::Title | Self::Icon | Self::Name | Self::Type | Self::Property => ValueShape::Text,
            Self::ViewArguments | Self::Template => ValueShape::Object,
            Self::Confirm => ValueShape::Bool,
            Self::View | Self::Session | Self::Value => ValueShape::Any,
        }
    }
}

/// Known actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Navigate back.
    Back,
    /// Create an item from a template.
    AddItem,
    /// Delete the current item.
    Delete,
    /// Duplicate the current item.
    Duplicate,
    /// Open a view.
    OpenView,
    /// Open a named view.
    OpenViewByName,
    /// Switch session.
    OpenSession,
    /// Star the current item.
    Star,
    /// Share the current item.
    Share,
    /// Show only starred items.
    ShowStarred,
    /// Toggle edit mode.
    ToggleEditMode,
    /// Toggle the filter panel.
    ToggleFilterPanel,
    /// Set a property on the current item.
    SetProperty,
}

impl ActionKind {
    /// Every action.
    pub const ALL: [Self; 13] = [
        Self::Back,
        Self::AddItem,
        Self::Delete,
        Self::Duplicate,
        Self::OpenView,
        Self::OpenViewByName,
        Self::OpenSession,
        Self::Star,
        Self::Share,
        Self::ShowStarred,
        Self::ToggleEditMode,
        Self::ToggleFilterPanel,
        Self::SetProperty,
    ];

    /// Action name as written in source.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Back => "back",
            Self::AddItem => "addItem",
            Self::Delete => "delete",
            Self::Duplicate => "duplicate",
            Self::OpenView => "openView",
            Self::OpenViewByName => "openViewByName",
            Self::OpenSession => "openSession",
            Self::Star => "star",
            Self::Share => "share",
            Self::ShowStarred => "showStarred",
            Self::ToggleEditMode => "toggleEditMode",
            Self::ToggleFilterPanel => "toggleFilterPanel",
            Self::SetProperty => "setProperty",
        }
    }

    /// Looks up an action by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }

    /// Arguments that must be present.
    #[must_use]
    pub const fn required_arguments(self) -> &'static [ActionArgument] {
        match self {
            Self::OpenViewByName => &[ActionArgument::Name],
            Self::OpenSession => &[ActionArgument::Session],
            Self::SetProperty => &[ActionArgument::Property, ActionArgument::Value],
            _ => &[],
        }
    }

    /// Arguments accepted beyond the required ones. `title` and `icon`
    /// are accepted on every action.
    #[must_use]
    pub const fn optional_arguments(self) -> &'static [ActionArgument] {
        match self {
            Self::AddItem => &[ActionArgument::Template, ActionArgument::Type],
            Self::Delete => &[ActionArgument::Confirm],
            Self::OpenView => &[ActionArgument::View, ActionArgument::ViewArguments],
            Self::OpenViewByName => &[ActionArgument::ViewArguments],
            _ => &[],
        }
    }

    /// Returns `true` if the action accepts `argument`.
    #[must_use]
    pub fn accepts(self, argument: ActionArgument) -> bool {
        matches!(argument, ActionArgument::Title | ActionArgument::Icon)
            || self.required_arguments().contains(&argument)
            || self.optional_arguments().contains(&argument)
    }
}
