//! Content pools the record factory samples from.

pub const NAMES: &[&str] = &[
    "Rohit Verma",
    "Amit Sharma",
    "Priya Patel",
    "Ankit Singh",
    "Neha Gupta",
    "Arjun Kumar",
    "Sneha Reddy",
    "Vikram Mehta",
    "Pooja Iyer",
    "Karan Joshi",
];

pub const EMAIL_DOMAINS: &[&str] = &["gmail.com", "outlook.com", "yahoo.com", "protonmail.com"];

pub const JOB_TITLES: &[&str] = &[
    "Machine Learning Engineer",
    "Computer Vision Engineer",
    "Deep Learning Engineer",
    "AI/ML Engineer",
    "Data Scientist",
];

pub const SUMMARIES: &[&str] = &[
    "Machine Learning Engineer with hands-on experience in building CNN-based computer vision \
     systems, model optimization, and deployment. Strong background in Python, PyTorch, and \
     applied deep learning.",
    "Computer Vision Engineer specializing in image processing and deep learning. Experienced in \
     developing production-ready CV systems using PyTorch and TensorFlow with focus on real-time \
     inference.",
    "Deep Learning Engineer with expertise in neural network architectures, model training, and \
     optimization. Proven track record in reducing inference time and improving model accuracy.",
    "AI/ML Engineer focused on developing end-to-end machine learning pipelines. Strong \
     foundation in computer vision, transfer learning, and cloud deployment strategies.",
    "Data Scientist with specialization in computer vision and deep learning. Experienced in \
     building CNN models for image classification, object detection, and semantic segmentation.",
];

/// (degree, field) pairs.
pub const DEGREES: &[(&str, &str)] = &[
    ("B.Tech", "Computer Science"),
    ("B.Tech", "Information Technology"),
    ("B.Tech", "Artificial Intelligence and Data Science"),
    ("B.Sc", "Computer Science"),
];

pub const INSTITUTIONS: &[&str] = &[
    "National Institute of Engineering",
    "Indian Institute of Technology",
    "Delhi Technological University",
    "Birla Institute of Technology",
    "VIT University",
];

pub const PROGRAMMING_SKILLS: &[&str] = &["Python", "C++", "Java", "JavaScript", "SQL"];

pub const ML_DL_SKILLS: &[&str] = &[
    "CNN",
    "Transfer Learning",
    "PyTorch",
    "TensorFlow",
    "Keras",
    "YOLO",
    "ResNet",
    "VGG",
    "Image Segmentation",
    "Object Detection",
];

pub const CV_SKILLS: &[&str] = &[
    "OpenCV",
    "Image Augmentation",
    "PIL/Pillow",
    "scikit-image",
    "Image Processing",
    "Feature Extraction",
];

pub const TOOLS: &[&str] = &["Git", "Docker", "Linux", "Jupyter", "AWS", "Azure", "MLflow", "DVC"];

pub const EXPERIENCE_BULLETS: &[&str] = &[
    "Developed CNN-based image classification models achieving {acc}% validation accuracy",
    "Implemented data augmentation pipeline improving model generalization by {imp}%",
    "Assisted in model deployment using Docker and achieved {perf}ms inference time",
    "Optimized model architecture reducing parameters by {red}% while maintaining accuracy",
    "Built end-to-end ML pipeline from data preprocessing to model serving",
    "Collaborated with cross-functional team of {team} engineers on CV projects",
    "Reduced model training time by {time}% through efficient data loading",
    "Implemented transfer learning using pre-trained ResNet achieving {acc}% accuracy",
];

pub struct ProjectTemplate {
    pub title: &'static str,
    pub bullets: [&'static str; 3],
}

pub const PROJECTS: &[ProjectTemplate] = &[
    ProjectTemplate {
        title: "Face Recognition System",
        bullets: [
            "Designed a CNN-based face recognition pipeline using PyTorch",
            "Trained on {data}k+ images with augmentation and achieved {acc}% accuracy",
            "Implemented real-time inference with {fps} FPS on CPU",
        ],
    },
    ProjectTemplate {
        title: "Plant Disease Detection",
        bullets: [
            "Built image classification model to detect {classes} crop diseases",
            "Reduced false negatives by {imp}% through class balancing",
            "Deployed model as REST API using Flask with {ms}ms response time",
        ],
    },
    ProjectTemplate {
        title: "Object Detection System",
        bullets: [
            "Implemented YOLOv5 for real-time object detection",
            "Achieved {map} mAP on custom dataset of {data}k images",
            "Optimized for edge deployment achieving {fps} FPS on Raspberry Pi",
        ],
    },
    ProjectTemplate {
        title: "Image Segmentation Pipeline",
        bullets: [
            "Developed U-Net based semantic segmentation model",
            "Achieved {iou}% IoU score on medical imaging dataset",
            "Processed {data}k+ images with automated preprocessing pipeline",
        ],
    },
    ProjectTemplate {
        title: "Document Scanner OCR",
        bullets: [
            "Built CNN-based document detection and text extraction system",
            "Integrated Tesseract OCR achieving {acc}% character accuracy",
            "Processed {data}+ documents with automated quality checks",
        ],
    },
    ProjectTemplate {
        title: "Deepfake Detection System",
        bullets: [
            "Trained CNN model to detect manipulated images and videos",
            "Achieved {acc}% detection accuracy on benchmark dataset",
            "Implemented real-time video analysis at {fps} FPS",
        ],
    },
];

pub const HOBBIES: &[&str] = &[
    "Contributing to Open Source ML Projects",
    "Reading Research Papers on Computer Vision",
    "Competitive Programming",
    "Photography and Image Processing",
    "Building Side Projects with AI",
    "Tech Blogging about Deep Learning",
];

/// Inclusive value range per metric marker, for project bullets.
pub const PROJECT_METRICS: &[(&str, u32, u32)] = &[
    ("acc", 88, 96),
    ("data", 5, 15),
    ("imp", 15, 30),
    ("ms", 50, 200),
    ("fps", 25, 60),
    ("classes", 5, 10),
    ("map", 75, 90),
    ("iou", 82, 94),
    ("red", 30, 50),
    ("perf", 10, 50),
    ("team", 3, 8),
    ("time", 20, 40),
];

/// Inclusive value range per metric marker, for experience bullets.
pub const EXPERIENCE_METRICS: &[(&str, u32, u32)] = &[
    ("acc", 88, 95),
    ("imp", 12, 25),
    ("red", 25, 45),
    ("perf", 15, 50),
    ("team", 3, 7),
    ("time", 25, 40),
];
